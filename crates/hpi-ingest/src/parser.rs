use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::types::{IndexRecord, PropertyType};

/// Each data row carries two cities side by side, four cells apiece.
const MIN_DATA_ROW_CELLS: usize = 8;

/// (name cell, value cell) for the left and right city blocks of a row.
const CITY_BLOCKS: [(usize, usize); 2] = [(0, 1), (4, 5)];

const MIN_CITY_CHARS: usize = 2;
const MAX_CITY_CHARS: usize = 4;

/// Header and summary labels that share the shape of a city cell.
const NON_CITY_MARKERS: [&str; 7] = ["城市", "环比", "同比", "定基", "平均", "上月", "上年"];

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("invalid selector: table"));

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: tr"));

static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("invalid selector: td"));

static RE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("invalid regex: digits"));

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

/// Joins every trimmed, non-empty text fragment below `element`.
fn stripped_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<String>()
}

/// Removes full-width (U+3000) and ASCII spaces, then trims surrounding whitespace.
pub fn clean_text(text: &str) -> String {
    text.replace(['\u{3000}', ' '], "").trim().to_string()
}

fn is_numeric(text: &str) -> bool {
    RE_DIGITS.is_match(&text.replacen('.', "", 1))
}

/// Returns the normalised city name when `raw` looks like one.
pub fn validate_city_name(raw: &str) -> Option<String> {
    let name = clean_text(raw);
    let len = name.chars().count();

    if !(MIN_CITY_CHARS..=MAX_CITY_CHARS).contains(&len) {
        return None;
    }
    if is_numeric(&name) {
        return None;
    }
    if NON_CITY_MARKERS.iter().any(|marker| name.contains(marker)) {
        return None;
    }

    Some(name)
}

fn parse_row(cells: &[ElementRef], property_type: PropertyType) -> Vec<IndexRecord> {
    CITY_BLOCKS
        .iter()
        .filter_map(|&(name_at, value_at)| {
            let name_cell = cells.get(name_at)?;
            let value_cell = cells.get(value_at)?;
            let Some(city) = validate_city_name(&elem_text(*name_cell)) else {
                log::debug!("Rejected city cell {:?}", elem_text(*name_cell).trim());
                return None;
            };

            Some(IndexRecord {
                city,
                property_type,
                value: stripped_text(*value_cell),
            })
        })
        .collect()
}

/// Extracts every city record from one report table.
pub fn parse_table(table: ElementRef, property_type: PropertyType) -> Vec<IndexRecord> {
    let mut records = Vec::new();

    for row in table.select(&ROW_SELECTOR) {
        let cells: Vec<ElementRef> = row.select(&CELL_SELECTOR).collect();
        if cells.len() < MIN_DATA_ROW_CELLS {
            continue;
        }
        records.extend(parse_row(&cells, property_type));
    }

    records
}

/// Extracts both property-type tables from a monthly report.
///
/// A missing table is logged and skipped; the other table is still read.
pub fn parse_report(html: &str, month: &str) -> Vec<IndexRecord> {
    let document = Html::parse_document(html);
    let tables: Vec<ElementRef> = document.select(&TABLE_SELECTOR).collect();

    let mut records = Vec::new();

    for property_type in PropertyType::ALL {
        let Some(table) = tables.get(property_type.table_index()) else {
            log::warn!(
                "{}: no {} table (found {} table(s)), skipping",
                month,
                property_type.tag(),
                tables.len()
            );
            continue;
        };

        let found = parse_table(*table, property_type);
        log::debug!(
            "{}: {} {} record(s)",
            month,
            found.len(),
            property_type.tag()
        );
        records.extend(found);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn row(cells: &[&str]) -> String {
        let tds: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
        format!("<tr>{}</tr>", tds)
    }

    fn report(tables: &[Vec<String>]) -> String {
        let body: String = tables
            .iter()
            .map(|rows| format!("<table>{}</table>", rows.concat()))
            .collect();
        format!("<html><body>{}</body></html>", body)
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("\u{3000}北京市\u{3000}"), "北京市");
        assert_eq!(clean_text(" 北 京 "), "北京");
        assert_eq!(clean_text("\n\t上海\r\n"), "上海");
    }

    #[test]
    fn test_city_name_validation() {
        assert_eq!(validate_city_name("北京").as_deref(), Some("北京"));
        assert_eq!(validate_city_name("环比"), None);
        assert_eq!(validate_city_name("12.5"), None);
        assert_eq!(validate_city_name("A"), None);
        assert_eq!(
            validate_city_name("\u{3000}北京市\u{3000}").as_deref(),
            Some("北京市")
        );
    }

    #[test]
    fn test_city_name_rejects_headers_and_lengths() {
        let rejected = [
            "",
            "\u{3000}\u{3000}",
            "城市",
            "环比指数",
            "同比",
            "定基",
            "平均",
            "上月=100",
            "上年同月",
            "乌鲁木齐市",
            "100",
            "1.5",
            "1.2.3",
        ];
        for name in rejected {
            assert_eq!(validate_city_name(name), None, "{:?} should be rejected", name);
        }
        assert_eq!(validate_city_name("乌鲁木齐").as_deref(), Some("乌鲁木齐"));
    }

    #[test]
    fn test_row_shape_filtering() {
        let html = report(&[vec![
            row(&["北京", "100.1", "x", "x", "上海", "99.9"]),
            row(&["天津", "100.2", "x", "x", "重庆", "100.3", "x", "x"]),
            row(&["广州", "100.4", "x", "x", "深圳", "100.5", "x", "x", "extra"]),
        ]]);

        let records = parse_report(&html, "202401");
        let cities: Vec<_> = records.iter().map(|r| r.city.as_str()).collect();

        assert_eq!(cities, vec!["天津", "重庆", "广州", "深圳"]);
        assert!(records.iter().all(|r| r.property_type == PropertyType::NewBuild));
        assert_eq!(records[3].value, "100.5");
    }

    #[test]
    fn test_rejected_left_city_keeps_right_city() {
        let html = report(&[vec![row(&[
            "城市", "环比", "同比", "定基", "南京", "100.6", "x", "x",
        ])]]);

        let records = parse_report(&html, "202401");
        assert_eq!(
            records,
            vec![IndexRecord {
                city: "南京".into(),
                property_type: PropertyType::NewBuild,
                value: "100.6".into(),
            }]
        );
    }

    #[test]
    fn test_value_is_raw_trimmed_text() {
        let html = report(&[vec![row(&[
            "\u{3000}杭\u{3000}州",
            "  <span> 101.0 </span> ",
            "x",
            "x",
            "宁波",
            "--",
            "x",
            "x",
        ])]]);

        let records = parse_report(&html, "202401");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].city, "杭州");
        assert_eq!(records[0].value, "101.0");
        assert_eq!(records[1].value, "--");
    }

    #[test]
    fn test_missing_secondhand_table() {
        let html = report(&[vec![row(&[
            "北京", "100.1", "x", "x", "上海", "99.9", "x", "x",
        ])]]);

        let records = parse_report(&html, "202401");
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.property_type == PropertyType::NewBuild));
    }

    #[test]
    fn test_document_without_tables() {
        let records = parse_report("<html><body><p>停更</p></body></html>", "202401");
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_report_from_fixture() {
        let html = fs::read_to_string("fixtures/202402.html").expect("Failed to read fixture");

        let records = parse_report(&html, "202402");

        let new_build: Vec<_> = records
            .iter()
            .filter(|r| r.property_type == PropertyType::NewBuild)
            .collect();
        let secondhand: Vec<_> = records
            .iter()
            .filter(|r| r.property_type == PropertyType::Secondhand)
            .collect();

        assert_eq!(new_build.len(), 6, "Should parse six new-build cities");
        assert_eq!(secondhand.len(), 6, "Should parse six secondhand cities");

        let beijing = new_build
            .iter()
            .find(|r| r.city == "北京")
            .expect("Beijing should be present");
        assert_eq!(beijing.value, "99.7");

        let shijiazhuang = secondhand
            .iter()
            .find(|r| r.city == "石家庄")
            .expect("Shijiazhuang should be present");
        assert_eq!(shijiazhuang.value, "99.4");

        assert!(
            records.iter().all(|r| !r.city.contains("城市")),
            "Header rows should be skipped"
        );
    }
}
