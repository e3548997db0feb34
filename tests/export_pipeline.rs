use kruznice::export::pdf::inspect;
use kruznice::{
    AuthorInfo, CircleParams, CirclePlot, ExportSettings, KruzniceConfig, ParamSummary, PointColor,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn default_form_exports_two_pages() {
    init_logging();
    let config = KruzniceConfig::default();
    let plot = CirclePlot::prepare(&CircleParams::default()).unwrap();
    let doc = plot
        .export_pdf(
            &config.author,
            &config.export,
            &CirclePlot::document_info(&config.author),
        )
        .unwrap();

    assert_eq!(doc.file_name(), "kruznice.pdf");
    assert_eq!(doc.mime_type(), "application/pdf");
    assert_eq!(inspect::page_count(doc.bytes()).unwrap(), 2);

    let text = inspect::page_text_lines(doc.bytes(), 1).unwrap();
    assert_eq!(
        text,
        vec![
            "Body na kružnici",
            "",
            "Střed: (0.0, 0.0)",
            "Poloměr: 1.0 m",
            "Počet bodů: 10",
            "Barva: #ff0000",
            "",
            "Autor: Valentýna Čížová",
            "Kontakt: 277735@vutbr.cz",
        ]
    );
}

#[test]
fn page_two_round_trips_parameters() {
    init_logging();
    let params = CircleParams {
        center_x: 12.5,
        center_y: -0.125,
        radius: 3.75,
        point_count: 100,
        color: "#0A0".to_string(),
        unit: "km".to_string(),
    };
    let plot = CirclePlot::prepare(&params).unwrap();
    let author = AuthorInfo {
        name: "Test".to_string(),
        email: "test@example.com".to_string(),
    };
    let doc = plot
        .export_pdf(&author, &ExportSettings::default(), &CirclePlot::document_info(&author))
        .unwrap();

    let lines = inspect::page_text_lines(doc.bytes(), 1).unwrap();
    let parsed = ParamSummary::parse(&lines.join("\n")).unwrap();
    assert_eq!(&parsed.spec(), plot.spec());
    assert_eq!(parsed.color, PointColor::new(0, 0xaa, 0));
    assert_eq!(parsed.unit, "km");
    assert_eq!(parsed.author, author);
}

#[test]
fn preview_uses_configured_resolution() {
    init_logging();
    let plot = CirclePlot::prepare(&CircleParams::default()).unwrap();
    let settings = ExportSettings {
        preview_dpi: 72.0,
        ..Default::default()
    };
    let image = plot.figure().rasterize(settings.preview_scale()).unwrap();
    assert_eq!(image.width(), plot.figure().width.ceil() as u32);
    assert_eq!(image.height(), plot.figure().height.ceil() as u32);
}

#[test]
fn invalid_form_input_is_rejected_before_export() {
    init_logging();
    for params in [
        CircleParams {
            radius: -1.0,
            ..Default::default()
        },
        CircleParams {
            point_count: 101,
            ..Default::default()
        },
        CircleParams {
            color: "red".to_string(),
            ..Default::default()
        },
        CircleParams {
            unit: "m\nPočet bodů: 3".to_string(),
            ..Default::default()
        },
        CircleParams {
            radius: 1e308,
            ..Default::default()
        },
        CircleParams {
            center_x: 1e17,
            radius: 1e-3,
            ..Default::default()
        },
    ] {
        assert!(CirclePlot::prepare(&params).is_err(), "{params:?} accepted");
    }
}

#[test]
fn non_latin_unit_and_author_survive_export() {
    init_logging();
    let params = CircleParams {
        unit: "μm".to_string(),
        ..Default::default()
    };
    let plot = CirclePlot::prepare(&params).unwrap();
    let author = AuthorInfo {
        name: "Michał Wiśniewski".to_string(),
        email: "michal@example.pl".to_string(),
    };
    let doc = plot
        .export_pdf(&author, &ExportSettings::default(), &CirclePlot::document_info(&author))
        .unwrap();

    let lines = inspect::page_text_lines(doc.bytes(), 1).unwrap();
    assert!(lines.contains(&"Poloměr: 1.0 μm".to_string()));
    let parsed = ParamSummary::parse(&lines.join("\n")).unwrap();
    assert_eq!(parsed.unit, "μm");
    assert_eq!(parsed.author, author);

    let labels = inspect::page_text_lines(doc.bytes(), 0).unwrap();
    assert!(labels.contains(&"x [μm]".to_string()));
}

#[test]
fn tiny_exponents_round_trip_through_page_two() {
    init_logging();
    let params = CircleParams {
        center_x: 1e-7,
        center_y: -3e-5,
        radius: 2.5e-6,
        ..Default::default()
    };
    let plot = CirclePlot::prepare(&params).unwrap();
    let author = AuthorInfo::default();
    let doc = plot
        .export_pdf(&author, &ExportSettings::default(), &CirclePlot::document_info(&author))
        .unwrap();
    let lines = inspect::page_text_lines(doc.bytes(), 1).unwrap();
    assert!(lines.contains(&"Střed: (1e-07, -3e-05)".to_string()));
    assert!(lines.contains(&"Poloměr: 2.5e-06 m".to_string()));
    let parsed = ParamSummary::parse(&lines.join("\n")).unwrap();
    assert_eq!(&parsed.spec(), plot.spec());
}
