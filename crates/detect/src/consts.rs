use regex::Regex;
use regex::bytes::Regex as BytesRegex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

macro_rules! bytes_regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<BytesRegex> = LazyLock::new(|| BytesRegex::new($regex).unwrap());
    };
}

// Literal strings may contain escaped parentheses, but not nested balanced ones.
const PDF_LITERAL: &str = r"\((?:[^()\\]|\\.)*\)";
const PDF_HEX: &str = r"<[0-9A-Fa-f\s]*>";

selector!(TITLE_SELECTOR, "title");
selector!(META_SELECTOR, "meta[name][content]");
selector!(META_CHARSET_SELECTOR, "meta[charset]");
selector!(META_HTTP_EQUIV_SELECTOR, "meta[http-equiv][content]");
selector!(HTML_LANG_SELECTOR, "html[lang]");
selector!(BODY_SELECTOR, "body");

regex!(WORD_REGEX, r"[\p{Alphabetic}']+");

bytes_regex!(PDF_VERSION_REGEX, r"^%PDF-(\d+\.\d+)");
bytes_regex!(
    PDF_INFO_REGEX,
    format!(r"(?s-u)/(Title|Author|Producer|Creator)\s*({PDF_LITERAL}|{PDF_HEX})").as_str()
);
bytes_regex!(PDF_PAGE_REGEX, r"(?-u)/Type\s*/Page(?:[^s]|$)");
bytes_regex!(PDF_COUNT_REGEX, r"(?-u)/Count\s+(\d+)");
bytes_regex!(
    PDF_TEXT_OP_REGEX,
    format!(r"(?s-u)({PDF_LITERAL})\s*(?:Tj|')|\[((?:{PDF_LITERAL}|[^\]])*)\]\s*TJ|\bET\b").as_str()
);
bytes_regex!(PDF_LITERAL_REGEX, format!(r"(?s-u){PDF_LITERAL}").as_str());
bytes_regex!(PDF_INFO_REF_REGEX, r"(?-u)/Info\s+(\d+)\s+(\d+)\s+R");
bytes_regex!(PDF_LENGTH_REGEX, r"(?-u)/Length\s+(\d+)(\s+\d+\s+R)?");
