//! Authored modification tables for the four TD-OB1 template
//! languages.
//!
//! Block indices refer to the original templates' text-block
//! numbering, which the `tobgen --debug` flag prints per page. Field
//! and strikethrough coordinates are page-space positions read off the
//! official forms.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::geometry::Rgb;
use crate::glyphs::{
    COMMA, GlyphCode, SLASH, SubstKey, Substitutions, capitalize, code_for, move_note, move_text,
    move_text_after, move_text_around, remove_dots,
};
use crate::template::{
    DocMeta, FieldPlacement, PageMods, SetText, StrikePlacement, TemplateMods, TextAlignment,
};

/// A TD-OB1 template language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Language {
    De,
    En,
    Fr,
    Nl,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::De, Language::En, Language::Fr, Language::Nl];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::De => "DE",
            Language::En => "EN",
            Language::Fr => "FR",
            Language::Nl => "NL",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DE" => Ok(Language::De),
            "EN" => Ok(Language::En),
            "FR" => Ok(Language::Fr),
            "NL" => Ok(Language::Nl),
            other => Err(format!("unknown language {other:?} (expected DE, EN, FR or NL)")),
        }
    }
}

// Field heights and widths shared by all languages.
const H: f64 = 17.0; // text field height (defines the font size)
const H_SIGNATURE: f64 = 50.0;
const H_LINE: f64 = 11.5; // height of a line of text
const W_MONTH: f64 = 20.0;
const W_YEAR: f64 = 32.0;
const W_IDENT: f64 = 225.0;
const W_QUANTITY: f64 = 40.0;
const W_TAX: f64 = 125.0;
const W_LOCATION: f64 = 150.0;
const W_DATE: f64 = 80.0;
const W_SIGNATURE: f64 = 150.0;
const W_SIGNER: f64 = 300.0;

const STRIKE_THICKNESS: f64 = 0.72;
const STRIKE_COLOR: Rgb = Rgb::new(0.898, 0.133, 0.216);

fn field(x: f64, y: f64, width: f64, height: f64) -> FieldPlacement {
    FieldPlacement {
        x,
        y,
        width,
        height,
        alignment: TextAlignment::Start,
    }
}

fn field_end(x: f64, y: f64, width: f64, height: f64) -> FieldPlacement {
    FieldPlacement {
        alignment: TextAlignment::End,
        ..field(x, y, width, height)
    }
}

fn remove_set(singles: &[usize], ranges: &[(usize, usize)]) -> BTreeSet<usize> {
    let mut set: BTreeSet<usize> = singles.iter().copied().collect();
    for &(start, end) in ranges {
        set.extend(start..=end);
    }
    set
}

/// Substitutions emptying the signature line and making room for the
/// location and date text fields around its comma.
fn empty_signature() -> Substitutions {
    Substitutions::new(remove_dots())
        .extend(vec![move_text_around(SubstKey::Code(COMMA), -15200, -9200, COMMA)])
}

/// Substitutions emptying the heading's date line: dotted fills go,
/// the extra spaces around both slashes go (centering the dates), and
/// room is made around each slash for the month and year fields.
fn empty_heading(space_ids: &[usize]) -> Substitutions {
    let spaces = space_ids
        .iter()
        .map(|&id| (SubstKey::Seq(id), String::new()))
        .collect();
    Substitutions::new(remove_dots())
        .extend(spaces)
        .extend(vec![move_text_around(SubstKey::Code(SLASH), -2200, -3200, SLASH)])
}

/// The month/year fields of the heading's declaration period.
/// `x_start`/`x_end` position the start and end date pairs, `y` is
/// their common baseline.
fn heading_fields(x_start: f64, x_end: f64, y: f64) -> Vec<(String, FieldPlacement)> {
    vec![
        ("start_month".into(), field_end(x_start, y, W_MONTH, H)),
        ("start_year".into(), field(x_start + W_MONTH + 2.0, y, W_YEAR, H)),
        ("end_month".into(), field_end(x_end, y, W_MONTH, H)),
        ("end_year".into(), field(x_end + W_MONTH + 2.0, y, W_YEAR, H)),
    ]
}

/// The declarant identification fields; `y` is the lowest line.
fn identification_fields(x: f64, y: f64) -> Vec<(String, FieldPlacement)> {
    vec![
        ("national_registration_number".into(), field(x, y + 4.0 * H_LINE, W_IDENT, H)),
        ("full_name".into(), field(x, y + 3.0 * H_LINE, W_IDENT, H)),
        ("address_line_1".into(), field(x, y + 2.0 * H_LINE, W_IDENT, H)),
        ("address_line_2".into(), field(x, y + H_LINE, W_IDENT, H)),
        ("address_line_3".into(), field(x, y, W_IDENT, H)),
    ]
}

/// One transaction table's quantity/base/value fields plus its total.
/// `x_quantity`/`y_quantity` position the lowest quantity field (the
/// 1.32% rate row); `y_total` is the table's total row.
fn table_fields(table: &str, x_quantity: f64, y_quantity: f64, y_total: f64) -> Vec<(String, FieldPlacement)> {
    let x_base = x_quantity + W_QUANTITY + 6.0;
    let x_value = x_base + W_TAX + 8.0;
    let y_132 = y_quantity;
    let y_035 = y_132 + 2.0 * H_LINE + 0.5;
    let y_012 = y_035 + 2.0 * H_LINE + 0.5;
    vec![
        (format!("table_{table}_tax_012_quantity"), field(x_quantity, y_012, W_QUANTITY, H)),
        (format!("table_{table}_tax_035_quantity"), field(x_quantity, y_035, W_QUANTITY, H)),
        (format!("table_{table}_tax_132_quantity"), field(x_quantity, y_132, W_QUANTITY, H)),
        (format!("table_{table}_tax_012_tax_base"), field_end(x_base, y_012, W_TAX, H)),
        (format!("table_{table}_tax_035_tax_base"), field_end(x_base, y_035, W_TAX, H)),
        (format!("table_{table}_tax_132_tax_base"), field_end(x_base, y_132, W_TAX, H)),
        (format!("table_{table}_tax_012_tax_value"), field_end(x_value, y_012, W_TAX, H)),
        (format!("table_{table}_tax_035_tax_value"), field_end(x_value, y_035, W_TAX, H)),
        (format!("table_{table}_tax_132_tax_value"), field_end(x_value, y_132, W_TAX, H)),
        (format!("table_{table}_total_tax_value"), field_end(x_value, y_total, W_TAX, H)),
    ]
}

fn total_field(x: f64, y: f64) -> Vec<(String, FieldPlacement)> {
    vec![("total_tax_value".into(), field_end(x, y, W_TAX, H))]
}

/// The location/date/signature/signer fields of the closing section.
fn signature_fields(x_location: f64, y_location: f64, x_signature: f64, y_signature: f64) -> Vec<(String, FieldPlacement)> {
    let x_date = x_location + W_LOCATION + 3.0;
    let x_signer = x_signature + W_SIGNATURE + 1.0;
    let y_signer = y_signature + (H_SIGNATURE - H) / 2.0;
    vec![
        ("location".into(), field(x_location, y_location, W_LOCATION, H)),
        ("date".into(), field(x_date, y_location, W_DATE, H)),
        ("signature".into(), field(x_signature, y_signature, W_SIGNATURE, H_SIGNATURE)),
        ("signer".into(), field(x_signer, y_signer, W_SIGNER, H)),
    ]
}

/// Strikethroughs over the three declarant categories of the
/// identification section; `y` is the lowest line (institution) and
/// `lengths` holds (professional, representative, institution) line
/// lengths.
fn identification_strikethroughs(x: f64, y: f64, lengths: [f64; 3]) -> Vec<(String, StrikePlacement)> {
    let strike = |y: f64, length: f64| StrikePlacement {
        x,
        y,
        length,
        thickness: STRIKE_THICKNESS,
        color: STRIKE_COLOR,
    };
    vec![
        ("prof".into(), strike(y + 2.0 * H_LINE, lengths[0])),
        ("repr".into(), strike(y + H_LINE, lengths[1])),
        ("inst".into(), strike(y, lengths[2])),
    ]
}

fn meta(title: &str) -> DocMeta {
    DocMeta {
        title: title.to_string(),
        author: "tobform".to_string(),
        producer: "tobform".to_string(),
        creator: "tobform".to_string(),
    }
}

/// The modification table for one language.
pub fn template_mods(lang: Language) -> TemplateMods {
    match lang {
        Language::De => german(),
        Language::En => english(),
        Language::Fr => french(),
        Language::Nl => dutch(),
    }
}

fn german() -> TemplateMods {
    let mut first = PageMods {
        remove_text: remove_set(
            // identification
            &[35, 39, 41, 45, 47],
            &[
                // table (a)
                (64, 81), (85, 102), (106, 123), (129, 145), (152, 158),
                // table (b)
                (176, 193), (196, 213), (216, 233), (239, 255), (262, 268),
            ],
        ),
        ..PageMods::default()
    };
    // heading: capitalize "Börsengeschäfte"; ä and ö sit outside the
    // alphabetic code range, so their codes are spelled out
    first.replace_text.insert(
        17,
        Substitutions::new(capitalize(&["rsengeschfte"])).extend(vec![
            (SubstKey::Code(GlyphCode(0x006C)), GlyphCode(0x0062).to_string()),
            move_text_after(SubstKey::Code(GlyphCode(0x007C)), 180, GlyphCode(0x0067)),
        ]),
    );
    first.replace_text.insert(18, empty_heading(&[9, 10, 17, 27]));
    first.replace_text.insert(19, Substitutions::new(vec![move_note(-3900)]));
    // identification
    first.replace_text.insert(24, Substitutions::new(capitalize(&["b"])));
    first.replace_text.insert(25, Substitutions::new(vec![move_note(-110)]));
    first.text_fields.extend(heading_fields(258.5, 376.0, 685.0));
    first.text_fields.extend(identification_fields(300.0, 534.0));
    first.text_fields.extend(table_fields("a", 237.0, 416.0, 346.5));
    first.text_fields.extend(table_fields("b", 237.0, 227.0, 157.0));
    first.strikethroughs = identification_strikethroughs(305.0, 610.0, [102.0, 68.0, 62.0]);

    let mut second = PageMods {
        remove_text: remove_set(
            &[],
            &[
                // table (c)
                (19, 37), (40, 57), (60, 77), (83, 100), (106, 112),
                // table (d)
                (131, 149), (152, 169), (172, 189), (195, 212), (218, 224),
                // total
                (229, 241),
            ],
        ),
        ..PageMods::default()
    };
    second.replace_text.insert(253, empty_signature());
    second.text_fields.extend(total_field(332.0, 313.0));
    second.text_fields.extend(signature_fields(84.0, 180.0, 69.0, 130.0));

    TemplateMods {
        pages: BTreeMap::from([(0, first), (1, second)]),
        meta: meta("Erklärung der Steuer auf Börsengeschäfte"),
    }
}

fn english() -> TemplateMods {
    let mut first = PageMods {
        remove_text: remove_set(
            // identification
            &[31, 35, 37, 41, 43],
            &[
                // table (a)
                (66, 83), (87, 104), (108, 125), (135, 151), (157, 163),
                // table (b)
                (187, 204), (207, 224), (227, 243), (253, 269), (276, 282),
            ],
        ),
        ..PageMods::default()
    };
    // heading: shift both lines left and capitalize the title words
    first.replace_text.insert(
        13,
        Substitutions::new(vec![move_text(SubstKey::Seq(0), 2100, code_for('D'))])
            .extend(capitalize(&["on", "stock", "exchange", "transactions"]))
            .extend(vec![move_text_after(SubstKey::Code(code_for('g')), 190, code_for('G'))]),
    );
    first.replace_text.insert(
        14,
        Substitutions::new(vec![move_text(SubstKey::Seq(0), 2100, code_for('F'))])
            .extend(empty_heading(&[22, 44]).into_entries()),
    );
    first.replace_text.insert(15, Substitutions::new(vec![move_note(-6100)]));
    // identification: capitalize the first "r"
    first.replace_text.insert(
        22,
        Substitutions::new(vec![(SubstKey::Seq(2), code_for('R').to_string())]),
    );
    first.replace_text.insert(23, Substitutions::new(vec![move_note(-450)]));
    first.text_fields.extend(heading_fields(255.0, 395.0, 719.0));
    first.text_fields.extend(identification_fields(300.0, 603.0));
    first.text_fields.extend(table_fields("a", 225.0, 427.5, 311.0));
    first.text_fields.extend(table_fields("b", 225.0, 181.0, 43.0));
    first.strikethroughs = identification_strikethroughs(307.0, 679.0, [123.0, 119.0, 79.0]);

    let mut second = PageMods {
        remove_text: remove_set(
            // replaced signature lines
            &[257, 259, 260],
            &[
                // table (c)
                (20, 37), (41, 58), (62, 79), (88, 104), (110, 116),
                // table (d)
                (139, 156), (160, 177), (181, 198), (207, 223), (229, 235),
                // total
                (241, 248),
            ],
        ),
        ..PageMods::default()
    };
    // move two signature lines up (into the blank lines above) so the
    // signature field has room
    second.set_text.insert(254, SetText::FromBlock(255));
    second.set_text.insert(255, SetText::FromBlock(257));
    second.replace_text.insert(255, empty_signature());
    second.text_fields.extend(total_field(332.0, 354.0));
    second.text_fields.extend(signature_fields(81.0, 272.0, 69.0, 222.0));

    TemplateMods {
        pages: BTreeMap::from([(0, first), (1, second)]),
        meta: meta("Declaration on the tax on stock-exchange transactions"),
    }
}

fn french() -> TemplateMods {
    let mut first = PageMods {
        remove_text: remove_set(
            // identification
            &[35, 39, 41, 45, 47],
            &[
                // table (a)
                (66, 83), (87, 104), (108, 125), (130, 147), (153, 159),
                // table (b)
                (178, 195), (198, 215), (218, 235), (240, 257), (263, 269),
            ],
        ),
        ..PageMods::default()
    };
    first.replace_text.insert(18, empty_heading(&[12, 13, 20, 31]));
    first.replace_text.insert(19, Substitutions::new(vec![move_note(-3900)]));
    first.text_fields.extend(heading_fields(267.0, 380.0, 685.0));
    first.text_fields.extend(identification_fields(300.0, 534.0));
    first.text_fields.extend(table_fields("a", 225.0, 427.5, 369.0));
    first.text_fields.extend(table_fields("b", 225.0, 250.0, 191.0));
    first.strikethroughs = identification_strikethroughs(305.0, 610.0, [131.0, 122.0, 77.0]);

    let mut second = PageMods {
        remove_text: remove_set(
            &[],
            &[
                // table (c)
                (21, 38), (42, 59), (63, 80), (85, 102), (110, 116),
                // table (d)
                (138, 155), (159, 176), (180, 197), (202, 219), (225, 231),
                // total
                (241, 248),
            ],
        ),
        ..PageMods::default()
    };
    second.replace_text.insert(260, empty_signature());
    second.text_fields.extend(total_field(333.0, 446.0));
    second.text_fields.extend(signature_fields(79.0, 306.0, 69.0, 251.0));

    TemplateMods {
        pages: BTreeMap::from([(0, first), (1, second)]),
        meta: meta("Déclaration de la taxe sur les opérations de bourse"),
    }
}

fn dutch() -> TemplateMods {
    let mut first = PageMods {
        remove_text: remove_set(
            // identification
            &[36, 39, 40, 42],
            &[
                // table (a)
                (60, 77), (80, 97), (100, 117), (123, 139), (150, 159),
                // table (b)
                (176, 193), (196, 213), (216, 233), (239, 255), (265, 273),
            ],
        ),
        ..PageMods::default()
    };
    first.replace_text.insert(18, empty_heading(&[13, 14, 25, 37]));
    first.replace_text.insert(19, Substitutions::new(vec![move_note(200)]));
    first.replace_text.insert(41, Substitutions::new(remove_dots()));
    first.text_fields.extend(heading_fields(257.0, 383.5, 685.0));
    first.text_fields.extend(identification_fields(300.0, 534.0));
    first.text_fields.extend(table_fields("a", 231.0, 404.5, 323.0));
    first.text_fields.extend(table_fields("b", 231.0, 205.0, 135.0));
    first.strikethroughs = identification_strikethroughs(307.0, 610.0, [128.0, 162.0, 52.0]);

    let mut second = PageMods {
        remove_text: remove_set(
            &[],
            &[
                // table (c)
                (18, 35), (39, 56), (60, 77), (84, 100), (111, 119),
                // table (d)
                (138, 155), (159, 176), (180, 197), (204, 220), (231, 239),
                // total
                (254, 262),
            ],
        ),
        ..PageMods::default()
    };
    second.replace_text.insert(274, empty_signature());
    second.text_fields.extend(total_field(338.0, 400.5));
    second.text_fields.extend(signature_fields(84.0, 260.0, 69.0, 205.0));

    TemplateMods {
        pages: BTreeMap::from([(0, first), (1, second)]),
        meta: meta("Aangifte van de taks op de beursverrichtingen"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_language_has_two_pages() {
        for lang in Language::ALL {
            let mods = template_mods(lang);
            assert_eq!(mods.pages.len(), 2, "{lang}");
        }
    }

    #[test]
    fn field_names_are_unique_per_document() {
        for lang in Language::ALL {
            let mods = template_mods(lang);
            let mut names = BTreeSet::new();
            for page in mods.pages.values() {
                for (name, _) in &page.text_fields {
                    assert!(names.insert(name.clone()), "{lang}: duplicate field {name}");
                }
            }
            // heading (4) + identification (5) + two tables (10 each) +
            // total (1) + signature section (4)
            assert_eq!(names.len(), 34, "{lang}");
        }
    }

    #[test]
    fn strikethroughs_cover_all_three_categories() {
        for lang in Language::ALL {
            let mods = template_mods(lang);
            let names: Vec<&str> = mods.pages[&0]
                .strikethroughs
                .iter()
                .map(|(n, _)| n.as_str())
                .collect();
            assert_eq!(names, ["prof", "repr", "inst"], "{lang}");
        }
    }

    #[test]
    fn language_parses_case_insensitively() {
        assert_eq!("nl".parse::<Language>().unwrap(), Language::Nl);
        assert_eq!("DE".parse::<Language>().unwrap(), Language::De);
        assert!("XX".parse::<Language>().is_err());
    }
}
