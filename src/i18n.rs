//! Language tables and localized date formatting.
//!
//! The site is built once per language in `Lang::ALL`. Each language
//! carries its UI strings, a flag glyph for the language selector, and a
//! date format (English long form, Portuguese "D de month de YYYY").

use chrono::{Datelike, NaiveDate};

use crate::build::frontmatter::DATE_FORMAT_INPUT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    En,
    Pt,
}

impl Lang {
    pub const ALL: [Lang; 2] = [Lang::En, Lang::Pt];
    pub const DEFAULT: Lang = Lang::En;

    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Pt => "pt",
        }
    }

    /// The alternate language.
    pub fn other(self) -> Lang {
        match self {
            Lang::En => Lang::Pt,
            Lang::Pt => Lang::En,
        }
    }

    pub fn strings(self) -> &'static Strings {
        match self {
            Lang::En => &EN_STRINGS,
            Lang::Pt => &PT_STRINGS,
        }
    }

    pub fn site_description(self, site_title: &str) -> String {
        match self {
            Lang::En => format!("Personal site of {site_title}"),
            Lang::Pt => format!("Site pessoal de {site_title}"),
        }
    }

    /// Inline SVG flag shown in the language selector (simplified
    /// circular flags).
    pub fn flag_svg(self) -> &'static str {
        match self {
            Lang::En => EN_FLAG,
            Lang::Pt => PT_FLAG,
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Per-language UI strings.
pub struct Strings {
    pub published_label: &'static str,
    pub updated_label: &'static str,
}

static EN_STRINGS: Strings = Strings {
    published_label: "Published",
    updated_label: "Updated",
};

static PT_STRINGS: Strings = Strings {
    published_label: "Publicado",
    updated_label: "Atualizado",
};

const PT_MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Format a `YYYY-MM-DD` date for display.
///
/// English: "January 10, 2026". Portuguese: "10 de janeiro de 2026".
/// Unparseable input is returned unchanged; date validity is reported
/// separately as a frontmatter warning.
pub fn format_date(date_str: &str, lang: Lang) -> String {
    let Ok(date) = NaiveDate::parse_from_str(date_str, DATE_FORMAT_INPUT) else {
        return date_str.to_string();
    };

    match lang {
        Lang::En => date.format("%B %d, %Y").to_string(),
        Lang::Pt => {
            let month = PT_MONTHS[date.month0() as usize];
            format!("{} de {} de {}", date.day(), month, date.year())
        }
    }
}

const EN_FLAG: &str = concat!(
    "<svg viewBox=\"0 0 100 100\" xmlns=\"http://www.w3.org/2000/svg\">",
    "<clipPath id=\"fc\"><circle cx=\"50\" cy=\"50\" r=\"50\"/></clipPath>",
    "<g clip-path=\"url(#fc)\">",
    "<rect width=\"100\" height=\"100\" fill=\"#bf0a30\"/>",
    "<rect y=\"8\" width=\"100\" height=\"7.7\" fill=\"#fff\"/>",
    "<rect y=\"23\" width=\"100\" height=\"7.7\" fill=\"#fff\"/>",
    "<rect y=\"38\" width=\"100\" height=\"7.7\" fill=\"#fff\"/>",
    "<rect y=\"54\" width=\"100\" height=\"7.7\" fill=\"#fff\"/>",
    "<rect y=\"69\" width=\"100\" height=\"7.7\" fill=\"#fff\"/>",
    "<rect y=\"84\" width=\"100\" height=\"7.7\" fill=\"#fff\"/>",
    "<rect width=\"42\" height=\"54\" fill=\"#002868\"/>",
    "</g></svg>"
);

const PT_FLAG: &str = concat!(
    "<svg viewBox=\"0 0 100 100\" xmlns=\"http://www.w3.org/2000/svg\">",
    "<clipPath id=\"fc\"><circle cx=\"50\" cy=\"50\" r=\"50\"/></clipPath>",
    "<g clip-path=\"url(#fc)\">",
    "<rect width=\"100\" height=\"100\" fill=\"#009c3b\"/>",
    "<polygon points=\"5,50 50,10 95,50 50,90\" fill=\"#ffdf00\"/>",
    "<circle cx=\"50\" cy=\"50\" r=\"20\" fill=\"#002776\"/>",
    "<circle cx=\"50\" cy=\"50\" r=\"17\" fill=\"none\" stroke=\"#fff\" stroke-width=\"1.5\"/>",
    "</g></svg>"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_lang() {
        assert_eq!(Lang::En.other(), Lang::Pt);
        assert_eq!(Lang::Pt.other(), Lang::En);
    }

    #[test]
    fn test_format_date_en() {
        assert_eq!(format_date("2026-01-10", Lang::En), "January 10, 2026");
        assert_eq!(format_date("2026-12-01", Lang::En), "December 01, 2026");
    }

    #[test]
    fn test_format_date_pt() {
        assert_eq!(format_date("2026-01-10", Lang::Pt), "10 de janeiro de 2026");
        assert_eq!(format_date("2026-03-05", Lang::Pt), "5 de março de 2026");
    }

    #[test]
    fn test_format_date_invalid_passthrough() {
        assert_eq!(format_date("not a date", Lang::En), "not a date");
        assert_eq!(format_date("2026/01/10", Lang::Pt), "2026/01/10");
    }

    #[test]
    fn test_strings() {
        assert_eq!(Lang::En.strings().published_label, "Published");
        assert_eq!(Lang::Pt.strings().updated_label, "Atualizado");
    }

    #[test]
    fn test_site_description() {
        assert_eq!(
            Lang::Pt.site_description("Ana Silva"),
            "Site pessoal de Ana Silva"
        );
    }
}
