use bh_app::{RunFlow, RunOutcome};
use bh_core::format_percent;
use bh_results::{AggregateStats, Metric, MissingMetricPolicy, accuracy_series, executive_summary};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Plot};

const CARD_BLUE: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);
const CARD_GREEN: egui::Color32 = egui::Color32::from_rgb(22, 163, 74);
const CARD_YELLOW: egui::Color32 = egui::Color32::from_rgb(202, 138, 4);
const CARD_PURPLE: egui::Color32 = egui::Color32::from_rgb(147, 51, 234);

#[derive(Default)]
pub struct DashboardView {
    show_summary: bool,
}

impl DashboardView {
    /// Returns true when "Run Federation" was clicked.
    pub fn show(&mut self, ui: &mut egui::Ui, flow: &mut RunFlow) -> bool {
        let mut run_clicked = false;

        ui.heading("Federation Dashboard");
        ui.add_space(8.0);

        ui.group(|ui| {
            ui.add_enabled(
                !flow.is_loading(),
                egui::TextEdit::singleline(&mut flow.model_id_input)
                    .hint_text("Model ID")
                    .desired_width(f32::INFINITY),
            );
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let label = if flow.is_loading() {
                    "Running..."
                } else {
                    "Run Federation"
                };
                if ui
                    .add_enabled(!flow.is_loading(), egui::Button::new(label))
                    .clicked()
                {
                    run_clicked = true;
                }
                if flow.is_loading() {
                    ui.spinner();
                }

                ui.separator();
                let mut exclude = flow.policy() == MissingMetricPolicy::Exclude;
                if ui
                    .checkbox(&mut exclude, "Exclude missing metrics from averages")
                    .on_hover_text("Off: a node that omits a metric counts as 0 for that metric")
                    .changed()
                {
                    flow.set_policy(if exclude {
                        MissingMetricPolicy::Exclude
                    } else {
                        MissingMetricPolicy::TreatAsZero
                    });
                }
            });
        });

        if let Some(error) = flow.last_error() {
            ui.add_space(8.0);
            ui.colored_label(egui::Color32::RED, error);
        }

        if let Some(outcome) = flow.outcome() {
            ui.add_space(12.0);
            self.show_outcome(ui, outcome);
        }

        run_clicked
    }

    fn show_outcome(&mut self, ui: &mut egui::Ui, outcome: &RunOutcome) {
        let stats = &outcome.stats;

        ui.columns(4, |cols| {
            summary_card(&mut cols[0], "Total Nodes", stats.total_nodes.to_string(), CARD_BLUE);
            summary_card(
                &mut cols[1],
                "Evaluated Nodes",
                stats.evaluated_count.to_string(),
                CARD_GREEN,
            );
            summary_card(
                &mut cols[2],
                "Skipped Nodes",
                stats.skipped_count.to_string(),
                CARD_YELLOW,
            );
            summary_card(
                &mut cols[3],
                "Model ID",
                outcome.model_id.to_string(),
                CARD_PURPLE,
            );
        });

        if !outcome.issues.is_empty() {
            ui.add_space(6.0);
            egui::CollapsingHeader::new(format!("⚠ {} payload issue(s)", outcome.issues.len()))
                .id_salt("payload_issues")
                .show(ui, |ui| {
                    for issue in &outcome.issues {
                        ui.colored_label(CARD_YELLOW, issue.to_string());
                    }
                });
        }

        // Means are only rendered when at least one node was evaluated.
        if let Some(averages) = stats.averages {
            ui.add_space(12.0);
            ui.group(|ui| {
                ui.strong("Average Performance Metrics");
                ui.columns(Metric::ALL.len(), |cols| {
                    for (i, (metric, value)) in averages.iter().enumerate() {
                        cols[i].vertical_centered(|ui| {
                            ui.weak(metric.label());
                            ui.heading(percent_or_na(metric, value));
                        });
                    }
                });
            });

            ui.add_space(12.0);
            self.show_accuracy_chart(ui, stats);
        }

        if !stats.evaluated.is_empty() {
            ui.add_space(12.0);
            ui.strong("Node Details");
            show_node_table(ui, stats);
        }

        if !stats.skipped.is_empty() {
            ui.add_space(12.0);
            ui.strong("Skipped Nodes");
            for node in &stats.skipped {
                ui.horizontal(|ui| {
                    ui.colored_label(CARD_YELLOW, "●");
                    ui.label(&node.node);
                    ui.weak(&node.reason);
                });
            }
        }

        ui.add_space(12.0);
        ui.checkbox(&mut self.show_summary, "Show executive summary");
        if self.show_summary {
            ui.group(|ui| {
                ui.label(executive_summary(stats));
            });
        }

        ui.add_space(8.0);
        egui::CollapsingHeader::new("Raw Results JSON")
            .id_salt("raw_json")
            .show(ui, |ui| {
                let text = outcome.result.to_pretty_json();
                ui.add(
                    egui::TextEdit::multiline(&mut text.as_str())
                        .code_editor()
                        .desired_width(f32::INFINITY),
                );
            });
    }

    fn show_accuracy_chart(&self, ui: &mut egui::Ui, stats: &AggregateStats) {
        let series = accuracy_series(stats);
        if series.is_empty() {
            return;
        }

        let bars: Vec<Bar> = series
            .iter()
            .enumerate()
            .map(|(i, (node, acc))| Bar::new(i as f64, acc * 100.0).name(node).width(0.6))
            .collect();
        let chart = BarChart::new(bars).name("Accuracy (%)").color(CARD_BLUE);

        Plot::new("accuracy_by_node")
            .legend(Legend::default())
            .height(220.0)
            .include_y(0.0)
            .include_y(100.0)
            .y_axis_label("Accuracy (%)")
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(chart);
            });
    }
}

fn summary_card(ui: &mut egui::Ui, title: &str, value: String, color: egui::Color32) {
    ui.group(|ui| {
        ui.vertical_centered(|ui| {
            ui.weak(title);
            ui.label(egui::RichText::new(value).size(22.0).strong().color(color));
        });
    });
}

fn show_node_table(ui: &mut egui::Ui, stats: &AggregateStats) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::initial(140.0).at_least(90.0))
        .columns(Column::initial(80.0).at_least(60.0), Metric::ALL.len())
        .column(Column::remainder().at_least(160.0))
        .header(22.0, |mut header| {
            header.col(|ui| {
                ui.strong("Node");
            });
            for metric in Metric::ALL {
                header.col(|ui| {
                    ui.strong(metric.label());
                });
            }
            header.col(|ui| {
                ui.strong("Fairness");
            });
        })
        .body(|mut body| {
            for node in &stats.evaluated {
                body.row(24.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&node.node);
                    });
                    for metric in Metric::ALL {
                        row.col(|ui| {
                            ui.label(percent_or_na(metric, node.metrics.get(metric)));
                        });
                    }
                    row.col(|ui| match &node.metrics.fairness_metric {
                        Some(fairness) => {
                            let groups = fairness
                                .group_accuracy
                                .iter()
                                .map(|(group, acc)| format!("{group} {}", format_percent(*acc, 1)))
                                .collect::<Vec<_>>()
                                .join(", ");
                            ui.label(format!("{}: {}", fairness.attribute, groups));
                        }
                        None => {
                            ui.weak("-");
                        }
                    });
                });
            }
        });
}

fn percent_or_na(metric: Metric, value: Option<f64>) -> String {
    value
        .map(|v| format_percent(v, metric.percent_decimals()))
        .unwrap_or_else(|| "n/a".to_string())
}
