use backoffice_ui::components::confirmation_modal::ConfirmRequest;
use backoffice_ui::components::edit_modal::FormSection;
use backoffice_ui::components::filters::Filter;
use backoffice_ui::components::statistics_cards::StatCard;
use backoffice_ui::components::table::{ColumnType, SortDirection, TableAction, TableColumn};
use backoffice_ui::models::{ComparisonData, Field, FieldType, InputField, InputType, Section, SelectOption};
use backoffice_ui::utils::format::format_try_currency;
use backoffice_ui::utils::log_trace::{download_logs, log_error, log_info, log_info_with_data};
use backoffice_ui::{
    ComparisonTable, ComparisonTableOptions, ConfirmationModal, ConfirmationOptions, DisplayModal,
    DisplayModalOptions, EditModal, EditModalOptions, FiltersComponent, FiltersOptions, StatisticsCards,
    StatisticsOptions, TableComponent, TableOptions,
};
use gloo::timers::future::TimeoutFuture;
use leptos::*;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

const SAMPLE_COMPARISON: &str = include_str!("../data/sample_comparison.json");

#[derive(Deserialize)]
struct ComparisonSample {
    data: ComparisonData,
    rates: BTreeMap<String, f64>,
}

fn report(context: &str, result: backoffice_ui::Result<()>) {
    if let Err(e) = result {
        log_error("demo", &format!("{}: {}", context, e));
    }
}

// ============================================
// Karşılaştırma
// ============================================

#[component]
fn ComparisonDemo() -> impl IntoView {
    let table = store_value(None::<ComparisonTable>);

    request_animation_frame(move || {
        let sample: ComparisonSample = match serde_json::from_str(SAMPLE_COMPARISON) {
            Ok(sample) => sample,
            Err(e) => {
                log_error("demo", &format!("Sample data is invalid: {}", e));
                return;
            }
        };
        let options = ComparisonTableOptions {
            currency_rates: Some(sample.rates),
            ..Default::default()
        };
        match ComparisonTable::new("demo-comparison", options) {
            Ok(t) => {
                t.on_recommendation_change(|item, supplier, _| {
                    log_info("demo", &format!("Item {} → supplier {}", item, supplier));
                });
                t.on_supplier_recommend_all(|supplier, recs| {
                    log_info_with_data("demo", &format!("All for {}", supplier), json!(recs.len()));
                });
                t.on_auto_save(|| log_info("demo", "Auto-save"));
                t.set_data(sample.data);
                table.set_value(Some(t));
            }
            Err(e) => log_error("demo", &e.to_string()),
        }
    });

    let export_csv = move |_| {
        table.with_value(|t| {
            if let Some(t) = t {
                report("CSV", t.export_to_csv("teklif-karsilastirma"));
            }
        })
    };
    let export_excel = move |_| {
        table.with_value(|t| {
            if let Some(t) = t {
                t.spawn_export_to_excel("teklif-karsilastirma");
            }
        })
    };

    view! {
        <div class="demo-toolbar">
            <button class="btn btn-sm btn-outline-success" on:click=export_csv>"CSV"</button>
            <button class="btn btn-sm btn-outline-success" on:click=export_excel>"Excel"</button>
        </div>
        <div id="demo-comparison"></div>
    }
}

// ============================================
// Görüntüle
// ============================================

#[component]
fn DisplayDemo() -> impl IntoView {
    let modal = store_value(None::<DisplayModal>);

    request_animation_frame(move || {
        let options = DisplayModalOptions {
            title: "Satın Alma Talebi".to_string(),
            show_edit_button: true,
            ..Default::default()
        };
        match DisplayModal::new("demo-display", options) {
            Ok(m) => {
                m.add_section(
                    Section::new("Talep Bilgileri")
                        .with_field(Field::new("no", "Talep No").with_value("PR-2024-0117").copyable())
                        .with_field(
                            Field::new("durum", "Durum")
                                .with_type(FieldType::Badge)
                                .with_value("Onay Bekliyor")
                                .with_badge_class("bg-warning"),
                        )
                        .with_field(Field::new("tarih", "Tarih").with_type(FieldType::Date).with_value("2024-03-15"))
                        .with_field(
                            Field::new("tutar", "Tahmini Tutar")
                                .with_type(FieldType::Currency)
                                .with_value(48250.5),
                        )
                        .with_field(Field::new("acil", "Acil").with_type(FieldType::Boolean).with_value(false)),
                )
                .add_section(
                    Section::new("İletişim")
                        .with_icon("fas fa-user", "text-success")
                        .with_field(Field::new("email", "E-posta").with_type(FieldType::Email).with_value("satinalma@firma.com.tr"))
                        .with_field(
                            Field::new("kalemler", "Kalemler")
                                .with_type(FieldType::List)
                                .with_value(json!(["Civata M8x40", "Somun M8"])),
                        ),
                )
                .render();
                m.on_edit(|data| log_info_with_data("demo", "Edit requested", Value::Object(data.clone())));
                modal.set_value(Some(m));
            }
            Err(e) => log_error("demo", &e.to_string()),
        }
    });

    let open = move |_| {
        modal.with_value(|m| {
            if let Some(m) = m {
                report("show", m.show());
            }
        })
    };
    let reprice = move |_| {
        modal.with_value(|m| {
            if let Some(m) = m {
                m.set_field_value("tutar", json!(51200.75));
            }
        })
    };

    view! {
        <div class="demo-toolbar">
            <button class="btn btn-sm btn-primary" on:click=open>"Talebi Görüntüle"</button>
            <button class="btn btn-sm btn-outline-secondary" on:click=reprice>"Tutarı Güncelle"</button>
        </div>
        <div id="demo-display"></div>
    }
}

// ============================================
// Düzenle
// ============================================

#[component]
fn EditDemo() -> impl IntoView {
    let modal = store_value(None::<EditModal>);
    let confirm = store_value(None::<ConfirmationModal>);
    let (fail_next, set_fail_next) = create_signal(false);

    request_animation_frame(move || {
        match EditModal::new("demo-edit", EditModalOptions::default()) {
            Ok(m) => {
                let mut miktar = InputField::new("miktar", "Miktar", InputType::Number)
                    .required()
                    .with_range(Some(1.0), Some(10_000.0))
                    .with_value(500);
                miktar.default_value = Some(json!(1));
                m.add_section(
                    FormSection::new("Kalem")
                        .with_field(InputField::new("ad", "Malzeme", InputType::Text).required().with_value("Civata M8x40"))
                        .with_field(miktar.with_col_size(6))
                        .with_field(
                            InputField::new("birim", "Birim", InputType::Select)
                                .with_options(vec![
                                    SelectOption::new("adet", "Adet"),
                                    SelectOption::new("kg", "Kilogram"),
                                    SelectOption::new("ton", "Ton"),
                                ])
                                .with_value("adet")
                                .with_col_size(6),
                        ),
                )
                .add_field(InputField::new("email", "Bildirim E-postası", InputType::Email).with_help("Opsiyonel"))
                .add_field(InputField::new("aciklama", "Açıklama", InputType::Textarea))
                .render();
                m.on_save(|data| async move {
                    TimeoutFuture::new(600).await;
                    log_info_with_data("demo", "Saved", Value::Object(data));
                    Ok(())
                });
                modal.set_value(Some(m));
            }
            Err(e) => log_error("demo", &e.to_string()),
        }
        match ConfirmationModal::new("demo-confirm", ConfirmationOptions::default()) {
            Ok(c) => confirm.set_value(Some(c)),
            Err(e) => log_error("demo", &e.to_string()),
        }
    });

    let open = move |_| {
        modal.with_value(|m| {
            if let Some(m) = m {
                report("show", m.show());
            }
        })
    };
    let delete = move |_| {
        let fail = fail_next.get_untracked();
        let request = ConfirmRequest::new("Talep silinsin mi?")
            .with_title("Talebi Sil")
            .with_description("Bu işlem geri alınamaz.")
            .with_details("<strong>PR-2024-0117</strong> · 4 kalem")
            .with_confirm_text("Sil")
            .on_confirm(move || async move {
                TimeoutFuture::new(800).await;
                if fail {
                    Err("Sunucu yanıt vermedi".to_string())
                } else {
                    Ok(())
                }
            })
            .on_cancel(|| log_info("demo", "Delete cancelled"));
        confirm.with_value(|c| {
            if let Some(c) = c {
                report("confirm", c.show(request));
            }
        })
    };

    view! {
        <div class="demo-toolbar">
            <button class="btn btn-sm btn-primary" on:click=open>"Kalemi Düzenle"</button>
            <button class="btn btn-sm btn-outline-danger" on:click=delete>"Talebi Sil"</button>
            <label class="ms-2">
                <input
                    type="checkbox"
                    prop:checked=fail_next
                    on:change=move |ev| set_fail_next.set(event_target_checked(&ev))
                />
                " Silme hatası simüle et"
            </label>
        </div>
        <div id="demo-edit"></div>
        <div id="demo-confirm"></div>
    }
}

// ============================================
// Tablo
// ============================================

fn sample_rows() -> Vec<Value> {
    let statuses = ["taslak", "onay", "sipariş"];
    (1..=47)
        .map(|i| {
            json!({
                "no": format!("PR-2024-{:04}", i),
                "talep_eden": { "ad": if i % 2 == 0 { "Ayşe Yılmaz" } else { "Mehmet Kaya" } },
                "tarih": format!("2024-03-{:02}", (i % 28) + 1),
                "tutar": (i as f64) * 1250.5,
                "durum": statuses[i % statuses.len()],
                "acil": i % 5 == 0,
            })
        })
        .collect()
}

fn compare_by(field: &str, a: &Value, b: &Value) -> std::cmp::Ordering {
    let (a, b) = (&a[field], &b[field]);
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[component]
fn TableDemo() -> impl IntoView {
    let table = store_value(None::<TableComponent>);

    request_animation_frame(move || {
        let options = TableOptions {
            title: Some("Satın Alma Talepleri".to_string()),
            columns: vec![
                TableColumn::new("no", "Talep No").read_only(),
                TableColumn::new("talep_eden.ad", "Talep Eden").not_sortable().read_only(),
                TableColumn::new("tarih", "Tarih").with_type(ColumnType::Date),
                TableColumn::new("tutar", "Tutar")
                    .with_type(ColumnType::Number)
                    .with_validator(|text, _| match text.trim().parse::<f64>() {
                        Ok(v) if v >= 0.0 => Ok(()),
                        _ => Err("Geçerli bir tutar girin".to_string()),
                    }),
                TableColumn::new("durum", "Durum").with_options(vec![
                    SelectOption::new("taslak", "Taslak"),
                    SelectOption::new("onay", "Onay"),
                    SelectOption::new("sipariş", "Sipariş"),
                ]),
                TableColumn::new("acil", "Acil").with_type(ColumnType::Boolean).read_only(),
            ],
            data: sample_rows(),
            pagination: true,
            items_per_page: 10,
            editable: true,
            striped: true,
            small: true,
            exportable: true,
            refreshable: true,
            ..Default::default()
        };
        match TableComponent::new("demo-table", options) {
            Ok(t) => {
                t.add_action(
                    TableAction::new("goruntule", "Görüntüle", "fas fa-eye")
                        .on_click(|row, _| log_info_with_data("demo", "View", row.clone())),
                );
                t.add_action(
                    TableAction::new("sil", "Sil", "fas fa-trash")
                        .with_class("btn-outline-danger")
                        .visible_when(|row, _| row["durum"] == "taslak")
                        .on_click(|row, index| log_info_with_data("demo", &format!("Delete row {}", index), row.clone())),
                );
                let handle = t.clone();
                t.on_sort(move |field, direction| {
                    let mut rows = handle.data();
                    rows.sort_by(|a, b| {
                        let ord = compare_by(field, a, b);
                        if direction == SortDirection::Desc {
                            ord.reverse()
                        } else {
                            ord
                        }
                    });
                    handle.update_data(rows, None);
                });
                let handle = t.clone();
                t.on_refresh(move || {
                    handle.set_loading(true);
                    let handle = handle.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        TimeoutFuture::new(500).await;
                        handle.update_data(sample_rows(), None);
                        handle.set_loading(false);
                    });
                });
                t.on_edit(|_row, field, new_value, _old| async move {
                    TimeoutFuture::new(300).await;
                    log_info("demo", &format!("{} = {}", field, new_value));
                    Ok(None)
                });
                table.set_value(Some(t));
            }
            Err(e) => log_error("demo", &e.to_string()),
        }
    });

    view! { <div id="demo-table"></div> }
}

// ============================================
// Filtreler
// ============================================

fn row_matches(row: &Value, filters: &Map<String, Value>) -> bool {
    let text = |key: &str| filters.get(key).and_then(Value::as_str).unwrap_or("");
    let no = text("no").to_lowercase();
    if !no.is_empty() && !row["no"].as_str().unwrap_or("").to_lowercase().contains(&no) {
        return false;
    }
    let durum = text("durum");
    if !durum.is_empty() && row["durum"] != durum {
        return false;
    }
    if filters.get("acil") == Some(&Value::Bool(true)) && row["acil"] != true {
        return false;
    }
    // ISO dates compare as strings
    let tarih = row["tarih"].as_str().unwrap_or("");
    let range = filters.get("tarih");
    let bound = |key: &str| range.and_then(|r| r[key].as_str()).filter(|s| !s.is_empty());
    bound("start").map_or(true, |start| tarih >= start) && bound("end").map_or(true, |end| tarih <= end)
}

fn summary_values(rows: &[&Value]) -> Vec<(usize, Value)> {
    let total: f64 = rows.iter().filter_map(|r| r["tutar"].as_f64()).sum();
    let urgent = rows.iter().filter(|r| r["acil"] == true).count();
    vec![
        (0, json!(rows.len())),
        (1, json!(format_try_currency(total))),
        (2, json!(urgent)),
    ]
}

#[component]
fn FiltersDemo() -> impl IntoView {
    let stats = store_value(None::<StatisticsCards>);
    let filters = store_value(None::<FiltersComponent>);

    request_animation_frame(move || {
        let rows = sample_rows();
        let all: Vec<&Value> = rows.iter().collect();
        let options = StatisticsOptions {
            cards: vec![
                StatCard::new("Talep", 0).with_icon("fas fa-inbox", "primary"),
                StatCard::new("Toplam Tutar", 0).with_icon("fas fa-lira-sign", "success"),
                StatCard::new("Acil", 0)
                    .with_icon("fas fa-bolt", "danger")
                    .with_tooltip("Acil işaretli talepler")
                    .clickable(),
            ],
            ..Default::default()
        };
        match StatisticsCards::new("demo-stats", options) {
            Ok(s) => {
                s.update_values(summary_values(&all));
                s.on_card_click(|_, card| log_info("demo", &format!("{} kartı", card.title)));
                stats.set_value(Some(s));
            }
            Err(e) => log_error("demo", &e.to_string()),
        }

        match FiltersComponent::new("demo-filters", FiltersOptions::default()) {
            Ok(f) => {
                f.add_filter(Filter::text("no", "Talep No").with_placeholder("PR-2024-..."))
                    .add_filter(Filter::select(
                        "durum",
                        "Durum",
                        vec![
                            SelectOption::new("taslak", "Taslak"),
                            SelectOption::new("onay", "Onay"),
                            SelectOption::new("sipariş", "Sipariş"),
                        ],
                    ).with_placeholder("Tümü"))
                    .add_filter(Filter::checkbox("acil", "Sadece acil"))
                    .add_filter(Filter::date_range("tarih", "Tarih"));
                f.on_apply(move |values| {
                    log_info_with_data("demo", "Filters applied", Value::Object(values.clone()));
                    let rows = sample_rows();
                    let matching: Vec<&Value> = rows.iter().filter(|r| row_matches(r, &values)).collect();
                    stats.with_value(|s| {
                        if let Some(s) = s {
                            s.update_values(summary_values(&matching));
                        }
                    });
                });
                f.on_clear(move || {
                    let rows = sample_rows();
                    let all: Vec<&Value> = rows.iter().collect();
                    stats.with_value(|s| {
                        if let Some(s) = s {
                            s.update_values(summary_values(&all));
                        }
                    });
                });
                f.on_filter_change(|id, value| log_info("demo", &format!("{} -> {}", id, value)));
                filters.set_value(Some(f));
            }
            Err(e) => log_error("demo", &e.to_string()),
        }
    });

    view! {
        <div id="demo-stats"></div>
        <div id="demo-filters"></div>
    }
}

// ============================================
// Main app (tabs)
// ============================================

#[derive(Clone, Copy, PartialEq)]
enum Tab {
    Comparison,
    Display,
    Edit,
    Table,
    Filters,
}

impl Tab {
    fn label(&self) -> &'static str {
        match self {
            Tab::Comparison => "Karşılaştırma",
            Tab::Display => "Görüntüle",
            Tab::Edit => "Düzenle",
            Tab::Table => "Tablo",
            Tab::Filters => "Filtreler",
        }
    }
}

#[component]
fn App() -> impl IntoView {
    let (current_tab, set_current_tab) = create_signal(Tab::Comparison);

    let on_download_logs = move |_| report("logs", download_logs());

    view! {
        <div class="app">
            <header class="app-header">
                <h1>"Back-office Bileşenleri"</h1>
                <nav class="tabs">
                    {[Tab::Comparison, Tab::Display, Tab::Edit, Tab::Table, Tab::Filters]
                        .into_iter()
                        .map(|tab| view! {
                            <button
                                class=move || if current_tab.get() == tab { "active" } else { "" }
                                on:click=move |_| set_current_tab.set(tab)
                            >
                                {tab.label()}
                            </button>
                        })
                        .collect_view()}
                </nav>
                <button class="btn btn-sm btn-link" on:click=on_download_logs>"Logları indir"</button>
            </header>

            <main class="container">
                {move || match current_tab.get() {
                    Tab::Comparison => view! { <ComparisonDemo /> }.into_view(),
                    Tab::Display => view! { <DisplayDemo /> }.into_view(),
                    Tab::Edit => view! { <EditDemo /> }.into_view(),
                    Tab::Table => view! { <TableDemo /> }.into_view(),
                    Tab::Filters => view! { <FiltersDemo /> }.into_view(),
                }}
            </main>
        </div>
    }
}

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}
