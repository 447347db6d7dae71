mod common;

use common::{template, RecordingSurface, SyntheticFonts};
use label_press::assets::TemplateKind;
use label_press::fonts::{FontCatalog, FontWeight};
use label_press::labels::{
    compose_product, compose_tea_bank, compose_tea_box, compose_tips, LabelGeometry, CREAM, ORANGE,
    RULE,
};
use label_press::records::{ProductRecord, TeaRecord, TipsRecord};

fn tea() -> TeaRecord {
    TeaRecord {
        tea_type: "Пуэр".into(),
        name: "Шу Гун Тин 2015".into(),
        price: 40,
    }
}

fn bank(record: &TeaRecord) -> RecordingSurface {
    let mut surface = RecordingSurface::default();
    compose_tea_bank(
        &mut surface,
        &SyntheticFonts::new(),
        &template(TemplateKind::TeaBank),
        &LabelGeometry::default().tea_bank,
        record,
    )
    .expect("bank label composes");
    surface
}

fn width_of(fonts: &SyntheticFonts, weight: FontWeight, text: &str, size: f64) -> f64 {
    fonts.metrics(weight).text_width(text, size)
}

#[test]
fn tea_bank_is_a_single_page_with_brand_and_rules() {
    let surface = bank(&tea());
    assert_eq!(surface.pages, vec![TemplateKind::TeaBank]);

    let brand: Vec<&str> = surface
        .texts
        .iter()
        .filter(|run| run.y == 1505.0)
        .map(|run| run.text.as_str())
        .collect();
    assert_eq!(brand, vec!["Ч", "АЙНАЯ", " ", "И", "СТОРИЯ"]);

    assert_eq!(surface.rules.len(), 2);
    let (_, upper) = surface.rules[0];
    assert_eq!(upper.from, (190.0, 855.0));
    assert_eq!(upper.to, (1654.0 - 190.0, 855.0));
    assert_eq!(upper.color, RULE);
    let (_, lower) = surface.rules[1];
    assert_eq!(lower.from, (260.0, 600.0));
}

#[test]
fn tea_type_rests_on_the_upper_rule() {
    let surface = bank(&tea());
    let run = surface.text("Пуэр").expect("tea type drawn");
    assert_eq!(run.weight, FontWeight::Bold);
    assert_eq!(run.size, 180.0);
    // Lowest glyph edge sits exactly the clearance above the rule.
    assert!((run.y - 180.0 * common::DESCENT - (855.0 + 36.0)).abs() < 1e-9);
}

#[test]
fn long_tea_type_stays_under_the_ceiling() {
    let record = TeaRecord {
        tea_type: "Высокогорный улун Те Гуань Инь".into(),
        ..tea()
    };
    let surface = bank(&record);
    let fonts = SyntheticFonts::new();
    let type_runs: Vec<_> = surface
        .texts
        .iter()
        .filter(|run| run.weight == FontWeight::Bold && run.y > 855.0 && run.y < 1505.0)
        .collect();
    assert_eq!(type_runs.len(), 2);

    let first = type_runs[0];
    let last = type_runs[1];
    assert!(first.y > last.y);
    assert!(first.y + first.size * common::ASCENT <= 1425.0 + 1e-9);
    assert!(last.y - last.size * common::DESCENT >= 855.0 + 36.0 - 1e-9);
    for run in type_runs {
        assert!(width_of(&fonts, FontWeight::Bold, &run.text, run.size) <= 1654.0 - 240.0);
    }
}

#[test]
fn tea_bank_prints_tier_and_price() {
    let surface = bank(&tea());
    let tier = surface.text("A++").expect("tier drawn");
    assert_eq!(tier.weight, FontWeight::Medium);
    assert!(tier.size <= 85.0);

    let price = surface.text("40₽").expect("price drawn");
    assert_eq!(price.weight, FontWeight::Bold);
    assert_eq!(price.size, 110.0);
}

#[test]
fn tea_box_splits_the_strip_into_columns() {
    let fonts = SyntheticFonts::new();
    let mut surface = RecordingSurface::default();
    compose_tea_box(
        &mut surface,
        &fonts,
        &template(TemplateKind::TeaBox),
        &LabelGeometry::default().tea_box,
        &tea(),
    )
    .expect("box label composes");

    assert_eq!(surface.pages, vec![TemplateKind::TeaBox]);
    let verticals: Vec<_> = surface.rules.iter().map(|(_, rule)| (rule.from, rule.to)).collect();
    assert_eq!(
        verticals,
        vec![((457.0, 30.0), (457.0, 206.0)), ((1524.0, 30.0), (1524.0, 206.0))]
    );

    let tea_type = surface.text("Пуэр").expect("tea type drawn");
    assert_eq!(tea_type.x, 60.0);

    let price = surface.text("40₽").expect("price drawn");
    let right = price.x + width_of(&fonts, FontWeight::Bold, "40₽", price.size);
    assert!((right - (1890.0 - 60.0)).abs() < 1e-9);

    let tier = surface.text("A++").expect("tier drawn");
    let right = tier.x + width_of(&fonts, FontWeight::Medium, "A++", tier.size);
    assert!((right - (1890.0 - 60.0)).abs() < 1e-9);
    assert!(price.y > tier.y);
}

#[test]
fn product_label_has_front_and_back() {
    let mut surface = RecordingSurface::default();
    compose_product(
        &mut surface,
        &SyntheticFonts::new(),
        &template(TemplateKind::Products),
        &LabelGeometry::default().products,
        &ProductRecord {
            name: "сэндвич.   свежий".into(),
            price: 250,
            hours: 24,
        },
    )
    .expect("product label composes");

    assert_eq!(surface.pages, vec![TemplateKind::Products, TemplateKind::Products]);
    let front = surface.texts_on(0);
    assert!(front.contains(&"Сэндвич. Свежий"), "{front:?}");
    assert!(front.contains(&"250₽"));
    let back = surface.texts_on(1);
    assert!(back.contains(&"Срок хранения"), "{back:?}");
    assert!(back.contains(&"24 часа"));
    // Brand on both sides.
    assert!(front.contains(&"СТОРИЯ") && back.contains(&"СТОРИЯ"));
}

#[test]
fn tips_card_places_qr_in_its_box() {
    let mut surface = RecordingSurface::default();
    let record = TipsRecord::new("Аня", "На новую кофемашину для всей смены", "https://pay.example/t/123")
        .expect("valid card");
    compose_tips(
        &mut surface,
        &SyntheticFonts::new(),
        &template(TemplateKind::TipsFront),
        &template(TemplateKind::TipsBack),
        &LabelGeometry::default().tips,
        &record,
    )
    .expect("tips card composes");

    assert_eq!(surface.pages, vec![TemplateKind::TipsFront, TemplateKind::TipsBack]);
    assert_eq!(surface.images.len(), 1);
    let qr = &surface.images[0];
    assert_eq!(qr.page, 0);
    assert_eq!(qr.pixels, (180, 180));
    assert_eq!((qr.placement.x, qr.placement.y), (234.0, 96.0));
    assert_eq!((qr.placement.width, qr.placement.height), (180.0, 180.0));

    let name = surface.text("Аня").expect("name drawn");
    let goal_runs: Vec<_> = surface
        .texts
        .iter()
        .filter(|run| run.weight == FontWeight::Regular)
        .collect();
    assert!(!goal_runs.is_empty());
    for run in &goal_runs {
        assert!(run.y < name.y);
        assert!(run.y - run.size * common::DESCENT > 330.0);
    }
    assert!(surface.texts_on(1).is_empty());
}

#[test]
fn composition_is_deterministic() {
    let first = bank(&tea());
    let second = bank(&tea());
    assert_eq!(first, second);
}

#[test]
fn palette_matches_brand_colors() {
    assert_eq!((ORANGE.r, ORANGE.g, ORANGE.b), (0xF6, 0x76, 0x3C));
    assert_eq!((CREAM.r, CREAM.g, CREAM.b), (0xF4, 0xEF, 0xE8));
}
