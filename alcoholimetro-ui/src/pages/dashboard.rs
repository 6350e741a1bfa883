//! Dashboard Page
//!
//! Session controls and the chart of readings delivered with the page.

use alcoholimetro::chart::DEFAULT_ALERT_THRESHOLD_PPM;
use alcoholimetro::{build_chart_config, SampleSummary};
use leptos::*;

use crate::api;
use crate::components::{AlcoholChart, SessionControls};

/// Dashboard page component
#[component]
pub fn Dashboard() -> impl IntoView {
    let samples = api::read_page_samples();
    let config = build_chart_config(&samples);
    let summary = SampleSummary::from_samples(&samples, DEFAULT_ALERT_THRESHOLD_PPM);

    view! {
        <div>
            <div class="mb-4">
                <h1 class="h3">"Panel de control"</h1>
                <p class="text-muted mb-0">"Estación de medición de alcohol"</p>
            </div>

            <SessionControls />

            <section class="card">
                <div class="card-body">
                    <h2 class="h5 mb-3">"Lecturas registradas"</h2>
                    {match summary {
                        Some(summary) => view! {
                            <p class="text-muted small">{summary.to_string()}</p>
                        }.into_view(),
                        None => view! {
                            <p class="text-muted">"Sin lecturas registradas"</p>
                        }.into_view(),
                    }}
                    <AlcoholChart config=config />
                </div>
            </section>
        </div>
    }
}
