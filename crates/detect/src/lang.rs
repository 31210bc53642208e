//! Language identification from extracted text.
//!
//! Scores text against short lists of each language's most frequent function
//! words. Scripts that don't separate words with spaces (Thai) are recognised
//! by code point range instead.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::consts;

/// At most this many words of a text are scored.
const MAX_WORDS: usize = 2_000;

/// A best-guess language.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LanguageGuess {
    /// ISO 639-1 code, e.g. `en`.
    pub code: String,
    /// Relative confidence in `0.0..=1.0`; not a probability.
    pub score: f32,
}

impl LanguageGuess {
    pub fn new(code: impl Into<String>, score: f32) -> Self {
        Self { code: code.into(), score }
    }

    /// English name of the guessed language, if known.
    pub fn name(&self) -> Option<&'static str> {
        language_name(&self.code)
    }
}

/// Language identification service.
pub trait LanguageIdentifier {
    /// Returns `None` when the text gives nothing to go on.
    fn identify(&self, text: &str) -> Option<LanguageGuess>;
}

/// Returns the English name for a supported ISO 639-1 code.
///
/// # Examples
///
/// ```
/// use delve_detect::language_name;
/// assert_eq!(language_name("nl"), Some("Dutch"));
/// assert_eq!(language_name("xx"), None);
/// ```
pub fn language_name(code: &str) -> Option<&'static str> {
    NAMES.get(code).copied()
}

static NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("da", "Danish"),
        ("de", "German"),
        ("el", "Greek"),
        ("en", "English"),
        ("es", "Spanish"),
        ("et", "Estonian"),
        ("fi", "Finnish"),
        ("fr", "French"),
        ("hu", "Hungarian"),
        ("is", "Icelandic"),
        ("it", "Italian"),
        ("nb", "Norwegian Bokmål"),
        ("nl", "Dutch"),
        ("pl", "Polish"),
        ("pt", "Portuguese"),
        ("ru", "Russian"),
        ("sv", "Swedish"),
        ("th", "Thai"),
    ])
});

/// Scoring order doubles as the tie-break order.
const STOPWORDS: &[(&str, &[&str])] = &[
    ("en", &[
        "the", "and", "of", "to", "in", "is", "that", "it", "was", "for", "with", "as", "his", "he", "be", "on",
        "by", "at", "have", "are", "this", "not", "but", "had", "from", "which", "she", "they", "you", "were",
        "her", "there", "been", "would", "their", "what", "we", "when", "who", "will",
    ]),
    ("de", &[
        "der", "die", "und", "in", "den", "von", "zu", "das", "mit", "sich", "des", "auf", "für", "ist", "im",
        "dem", "nicht", "ein", "eine", "als", "auch", "es", "an", "werden", "aus", "er", "hat", "dass", "sie",
        "nach", "wird", "bei", "einer", "um", "noch", "wie", "einem", "über", "einen", "so", "zum", "war", "haben",
        "nur", "oder", "aber", "vor", "zur", "bis", "mehr", "durch", "man", "sein", "wurde", "ich",
    ]),
    ("fr", &[
        "de", "la", "le", "et", "les", "des", "en", "un", "du", "une", "que", "est", "pour", "qui", "dans", "par",
        "plus", "pas", "au", "sur", "ne", "se", "ce", "il", "sont", "aux", "avec", "mais", "ont", "cette", "elle",
        "nous", "vous", "je", "était", "leur", "comme", "aussi", "où", "très",
    ]),
    ("es", &[
        "de", "la", "que", "el", "en", "y", "los", "del", "se", "las", "por", "un", "para", "con", "no", "una",
        "su", "al", "lo", "como", "más", "pero", "sus", "le", "ya", "o", "este", "sí", "porque", "esta", "entre",
        "cuando", "muy", "sin", "sobre", "también", "me", "hasta", "hay", "donde", "desde", "nos", "es", "fue",
    ]),
    ("it", &[
        "di", "e", "il", "la", "che", "in", "a", "per", "un", "del", "non", "una", "si", "della", "sono", "le",
        "da", "con", "è", "dei", "gli", "al", "nel", "alla", "anche", "più", "ma", "come", "questo", "ha",
        "delle", "nella", "lo", "ci", "io", "essere", "hanno", "era", "sul", "perché",
    ]),
    ("pt", &[
        "de", "a", "o", "que", "e", "do", "da", "em", "um", "para", "com", "não", "uma", "os", "no", "se", "na",
        "por", "mais", "as", "dos", "como", "mas", "ao", "ele", "das", "à", "seu", "sua", "ou", "quando", "muito",
        "nos", "já", "eu", "também", "só", "pelo", "pela", "até", "isso", "ela", "entre", "depois", "são", "foi",
    ]),
    ("nl", &[
        "de", "en", "van", "ik", "te", "dat", "die", "in", "een", "hij", "het", "niet", "zijn", "is", "was", "op",
        "aan", "met", "als", "voor", "had", "er", "maar", "om", "hem", "dan", "zou", "of", "wat", "mijn", "men",
        "dit", "zo", "door", "over", "ze", "zich", "bij", "ook", "tot", "je", "mij", "uit", "der", "daar", "haar",
        "naar", "heb", "hoe", "heeft", "worden", "wordt",
    ]),
    ("da", &[
        "og", "i", "jeg", "det", "at", "en", "den", "til", "er", "som", "på", "de", "med", "han", "af", "for",
        "ikke", "der", "var", "mig", "sig", "men", "et", "har", "om", "vi", "min", "havde", "ham", "hun", "nu",
        "over", "da", "fra", "du", "ud", "sin", "dem", "os", "op", "man", "hans", "hvor", "eller", "hvad",
        "skal", "selv", "her", "alle", "vil", "blev", "kunne", "ind", "når", "være", "noget", "efter", "også",
    ]),
    ("nb", &[
        "og", "i", "jeg", "det", "at", "en", "et", "den", "til", "er", "som", "på", "de", "med", "han", "av",
        "ikke", "der", "så", "var", "meg", "seg", "men", "ett", "har", "om", "vi", "min", "mitt", "ha", "hadde",
        "hun", "nå", "over", "da", "ved", "fra", "du", "ut", "sin", "dem", "oss", "opp", "man", "kan", "hans",
        "hvor", "eller", "hva", "skal", "selv", "sjøl", "her", "alle", "vil", "bli", "ble", "blitt", "kunne",
        "inn", "når", "være", "kom", "noen", "noe", "ville", "dere", "deres", "kun", "ja", "etter", "ned",
        "skulle", "denne", "deg", "hennes", "hvordan", "ikkje",
    ]),
    ("sv", &[
        "och", "det", "att", "i", "en", "jag", "hon", "som", "han", "på", "den", "med", "var", "sig", "för",
        "så", "till", "är", "men", "ett", "om", "hade", "de", "av", "icke", "mig", "du", "henne", "då", "sin",
        "nu", "har", "inte", "hans", "honom", "skulle", "hennes", "där", "min", "man", "ej", "vid", "kunde",
        "något", "från", "ut", "när", "efter", "upp", "vi", "dem", "vara", "vad", "över", "än", "dig", "kan",
    ]),
    ("fi", &[
        "olla", "olen", "olet", "on", "olemme", "olette", "ovat", "ole", "oli", "ja", "että", "ei", "se", "hän",
        "ne", "mutta", "kun", "niin", "kuin", "jos", "tai", "vaan", "myös", "jo", "vain", "nyt", "sitten",
        "minä", "sinä", "me", "te", "he", "tämä", "tuo", "mikä", "joka", "mitä", "sen", "sitä", "hänen",
    ]),
    ("et", &[
        "ja", "on", "et", "ei", "see", "ta", "oli", "kui", "aga", "ka", "mis", "ning", "oma", "nii", "või",
        "kes", "siis", "veel", "seda", "selle", "mida", "tema", "nad", "mina", "sina", "meie", "teie", "olen",
        "pole", "juba", "kõik", "üle", "ainult", "väga", "kuid", "sest", "kus", "seal", "siin", "ole",
    ]),
    ("hu", &[
        "a", "az", "és", "hogy", "nem", "is", "egy", "meg", "de", "van", "csak", "már", "ez", "mint", "még",
        "volt", "el", "ki", "be", "fel", "azt", "ha", "kell", "pedig", "vagy", "sem", "lesz", "úgy", "ezt",
        "nagyon", "minden", "mert", "után", "között", "ami", "aki", "így", "itt", "ott", "amely",
    ]),
    ("is", &[
        "og", "að", "í", "á", "er", "sem", "það", "til", "við", "um", "af", "ekki", "var", "með", "en", "hann",
        "hún", "þeir", "þau", "ég", "þú", "við", "þetta", "þessi", "eða", "frá", "þegar", "eftir", "hafa",
        "hefur", "voru", "vera", "mjög", "einnig", "þar", "hér", "svo", "líka", "upp", "út",
    ]),
    ("pl", &[
        "i", "w", "nie", "się", "na", "z", "do", "to", "że", "jest", "jak", "o", "co", "ale", "po", "tak",
        "za", "od", "tylko", "już", "czy", "jego", "jej", "przez", "był", "była", "było", "bardzo", "może",
        "są", "dla", "ten", "ta", "jednak", "kiedy", "gdzie", "tym", "także", "oraz", "który", "która",
    ]),
    ("ru", &[
        "и", "в", "не", "на", "я", "что", "он", "с", "как", "а", "то", "все", "она", "так", "его", "но", "да",
        "ты", "к", "у", "же", "вы", "за", "бы", "по", "только", "ее", "мне", "было", "вот", "от", "меня",
        "еще", "нет", "о", "из", "ему", "теперь", "когда", "это", "был", "для", "они", "мы", "или",
    ]),
    ("el", &[
        "και", "το", "να", "του", "η", "της", "με", "που", "την", "από", "για", "τα", "είναι", "των", "στο",
        "ο", "σε", "θα", "δεν", "τη", "τον", "οι", "στην", "ένα", "στη", "μια", "αλλά", "στα", "τις", "ότι",
        "όπως", "στον", "αυτό", "έχει", "μας", "τους", "ή", "πιο", "όταν", "ήταν",
    ]),
];

static STOPWORD_SETS: LazyLock<HashMap<&'static str, HashSet<&'static str>>> = LazyLock::new(|| {
    STOPWORDS
        .iter()
        .map(|(code, words)| (*code, words.iter().copied().collect()))
        .collect()
});

fn is_thai(c: char) -> bool {
    ('\u{0E00}'..='\u{0E7F}').contains(&c)
}

/// Stop-word frequency [`LanguageIdentifier`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StopwordIdentifier;

impl StopwordIdentifier {
    pub fn new() -> Self {
        Self
    }

    /// Codes of every language this identifier can return.
    pub fn supported(&self) -> impl Iterator<Item = &'static str> {
        STOPWORDS.iter().map(|(code, _)| *code).chain(std::iter::once("th"))
    }
}

impl LanguageIdentifier for StopwordIdentifier {
    fn identify(&self, text: &str) -> Option<LanguageGuess> {
        let (mut letters, mut thai) = (0usize, 0usize);
        for c in text.chars().filter(|c| c.is_alphabetic()) {
            letters += 1;
            thai += usize::from(is_thai(c));
        }
        if letters == 0 {
            return None;
        }
        if thai * 2 > letters {
            return Some(LanguageGuess::new("th", thai as f32 / letters as f32));
        }

        let words: Vec<String> = consts::WORD_REGEX
            .find_iter(text)
            .take(MAX_WORDS)
            .map(|m| m.as_str().trim_matches('\'').to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        let (code, hits) = STOPWORDS
            .iter()
            .map(|(code, _)| {
                let set = &STOPWORD_SETS[code];
                (*code, words.iter().filter(|w| set.contains(w.as_str())).count())
            })
            // `max_by_key` keeps the last maximum; reversing keeps the first.
            .rev()
            .max_by_key(|&(_, hits)| hits)?;
        if hits == 0 {
            return None;
        }
        Some(LanguageGuess::new(code, hits as f32 / words.len() as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("en", "The quick brown fox jumps over the lazy dog and it was not the first time that he had done this.")]
    #[case("de", "Der Hund ist nicht so schnell wie die Katze, aber er hat auch mehr Ausdauer und das ist gut.")]
    #[case("fr", "Le chat est sur la table et il ne veut pas descendre, mais nous avons une idée pour le faire.")]
    #[case("es", "El perro de mi hermano es muy grande y no le gusta estar en la casa cuando hay tormenta.")]
    #[case("it", "Il gatto della mia vicina non è mai stato così tranquillo come in questo periodo dell'anno.")]
    #[case("nl", "Het is een mooie dag en ik heb geen zin om binnen te zitten, dus ik ga naar het park.")]
    #[case("sv", "Jag har inte sett henne sedan hon flyttade till staden, men hon skulle komma hem i dag.")]
    #[case("fi", "Minä olen kotona ja hän on töissä, mutta me olemme yhdessä illalla kun ilma on kaunis.")]
    #[case("pl", "To jest bardzo dobry dzień, ale nie wiem czy pójdę do parku, bo jest tylko trochę zimno.")]
    #[case("ru", "Я не знаю, что он хочет, но она сказала, что это было только для нас и для них.")]
    #[case("el", "Η γάτα είναι στο σπίτι και δεν θέλει να βγει έξω, αλλά ο σκύλος θα πάει για βόλτα.")]
    #[case("th", "ภาษาไทยเป็นภาษาที่มีวรรณยุกต์")]
    fn identifies(#[case] expected: &str, #[case] text: &str) {
        let guess = StopwordIdentifier.identify(text).unwrap();
        assert_eq!(guess.code, expected);
        assert!(guess.score > 0.0 && guess.score <= 1.0);
    }

    #[rstest]
    #[case("")]
    #[case("   \n\t ")]
    #[case("12345 67890 !!!")]
    #[case("zzyzx qwrtp")]
    fn nothing_to_go_on(#[case] text: &str) {
        assert_eq!(StopwordIdentifier.identify(text), None);
    }

    #[test]
    fn every_supported_language_has_a_name() {
        for code in StopwordIdentifier.supported() {
            assert!(language_name(code).is_some(), "{code} has no name");
        }
        assert_eq!(LanguageGuess::new("th", 1.0).name(), Some("Thai"));
    }
}
