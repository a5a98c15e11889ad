//! Static bilingual language registry.
//!
//! Maps language names — English or native — to ISO-style codes and back.
//! Lookup is case-insensitive and folds common Latin diacritics, so
//! "Francais" resolves the same as "français". The table is fixed at
//! compile time; there is no mutable state.

/// (english name, native name, code), ordered alphabetically by code.
const LANGUAGES: &[(&str, &str, &str)] = &[
    ("Afrikaans", "Afrikaans", "af"),
    ("Amharic", "አማርኛ", "am"),
    ("Arabic", "العربية", "ar"),
    ("Mapudungun", "Mapudungun", "arn"),
    ("Moroccan Arabic", "الدارجة المغربية", "ary"),
    ("Assamese", "অসমীয়া", "as"),
    ("Azerbaijani", "Azərbaycan", "az"),
    ("Bashkir", "Башҡорт", "ba"),
    ("Belarusian", "беларуская", "be"),
    ("Bulgarian", "български", "bg"),
    ("Bengali", "বাংলা", "bn"),
    ("Tibetan", "བོད་ཡིག", "bo"),
    ("Breton", "brezhoneg", "br"),
    ("Bosnian", "bosanski/босански", "bs"),
    ("Catalan", "català", "ca"),
    ("Central Kurdish", "کوردیی ناوەندی", "ckb"),
    ("Corsican", "Corsu", "co"),
    ("Czech", "čeština", "cs"),
    ("Welsh", "Cymraeg", "cy"),
    ("Danish", "dansk", "da"),
    ("German", "Deutsch", "de"),
    ("Lower Sorbian", "dolnoserbšćina", "dsb"),
    ("Divehi", "ދިވެހިބަސް", "dv"),
    ("Greek", "Ελληνικά", "el"),
    ("English", "English", "en"),
    ("Spanish", "español", "es"),
    ("Estonian", "eesti", "et"),
    ("Basque", "euskara", "eu"),
    ("Persian", "فارسى", "fa"),
    ("Finnish", "suomi", "fi"),
    ("Filipino", "Filipino", "fil"),
    ("Faroese", "føroyskt", "fo"),
    ("French", "français", "fr"),
    ("Frisian", "Frysk", "fy"),
    ("Irish", "Gaeilge", "ga"),
    ("Scottish Gaelic", "Gàidhlig", "gd"),
    ("Gilbertese", "Taetae ni Kiribati", "gil"),
    ("Galician", "galego", "gl"),
    ("Swiss German", "Schweizerdeutsch", "gsw"),
    ("Gujarati", "ગુજરાતી", "gu"),
    ("Hausa", "Hausa", "ha"),
    ("Hebrew", "עברית", "he"),
    ("Hindi", "हिंदी", "hi"),
    ("Croatian", "hrvatski", "hr"),
    ("Serbo-Croatian", "srpskohrvatski/српскохрватски", "hrv"),
    ("Upper Sorbian", "hornjoserbšćina", "hsb"),
    ("Hungarian", "magyar", "hu"),
    ("Armenian", "Հայերեն", "hy"),
    ("Indonesian", "Bahasa Indonesia", "id"),
    ("Igbo", "Igbo", "ig"),
    ("Yi", "ꆈꌠꁱꂷ", "ii"),
    ("Icelandic", "íslenska", "is"),
    ("Italian", "italiano", "it"),
    ("Inuktitut", "Inuktitut /ᐃᓄᒃᑎᑐᑦ (ᑲᓇᑕ)", "iu"),
    ("Japanese", "日本語", "ja"),
    ("Georgian", "ქართული", "ka"),
    ("Kazakh", "Қазақша", "kk"),
    ("Greenlandic", "kalaallisut", "kl"),
    ("Khmer", "ខ្មែរ", "km"),
    ("Kannada", "ಕನ್ನಡ", "kn"),
    ("Korean", "한국어", "ko"),
    ("Konkani", "कोंकणी", "kok"),
    ("Kurdish", "Kurdî/کوردی", "ku"),
    ("Kyrgyz", "Кыргыз", "ky"),
    ("Luxembourgish", "Lëtzebuergesch", "lb"),
    ("Lao", "ລາວ", "lo"),
    ("Lithuanian", "lietuvių", "lt"),
    ("Latvian", "latviešu", "lv"),
    ("Maori", "Reo Māori", "mi"),
    ("Macedonian", "македонски јазик", "mk"),
    ("Malayalam", "മലയാളം", "ml"),
    ("Mongolian", "Монгол хэл/ᠮᠤᠨᠭᠭᠤᠯ ᠬᠡᠯᠡ", "mn"),
    ("Mohawk", "Kanien'kéha", "moh"),
    ("Marathi", "मराठी", "mr"),
    ("Malay", "Bahasa Malaysia", "ms"),
    ("Maltese", "Malti", "mt"),
    ("Burmese", "မြန်မာဘာသာ", "my"),
    ("Norwegian (Bokmål)", "norsk (bokmål)", "nb"),
    ("Nepali", "नेपाली (नेपाल)", "ne"),
    ("Dutch", "Nederlands", "nl"),
    ("Norwegian (Nynorsk)", "norsk (nynorsk)", "nn"),
    ("Norwegian", "norsk", "no"),
    ("Occitan", "occitan", "oc"),
    ("Odia", "ଓଡ଼ିଆ", "or"),
    ("Punjabi", "ਪੰਜਾਬੀ / پنجابی", "pa"),
    ("Papiamento", "Papiamentu", "pap"),
    ("Polish", "polski", "pl"),
    ("Dari", "درى", "prs"),
    ("Pashto", "پښتو", "ps"),
    ("Portuguese", "português", "pt"),
    ("Quechua", "runasimi", "qu"),
    ("K'iche", "K'iche", "quc"),
    ("Romansh", "Rumantsch", "rm"),
    ("Romanian", "română", "ro"),
    ("Russian", "русский", "ru"),
    ("Kinyarwanda", "Kinyarwanda", "rw"),
    ("Sanskrit", "संस्कृत", "sa"),
    ("Yakut", "саха", "sah"),
    ("Sami (Northern)", "davvisámegiella", "se"),
    ("Sinhala", "සිංහල", "si"),
    ("Slovak", "slovenčina", "sk"),
    ("Slovenian", "slovenski", "sl"),
    ("Sami (Southern)", "åarjelsaemiengiele", "sma"),
    ("Sami (Lule)", "julevusámegiella", "smj"),
    ("Sami (Inari)", "sämikielâ", "smn"),
    ("Sami (Skolt)", "sääʹmǩiõll", "sms"),
    ("Albanian", "shqip", "sq"),
    ("Serbian", "srpski/српски", "sr"),
    ("Sesotho", "Sesotho sa Leboa", "st"),
    ("Swedish", "svenska", "sv"),
    ("Kiswahili", "Kiswahili", "sw"),
    ("Syriac", "ܣܘܪܝܝܐ", "syc"),
    ("Tamil", "தமிழ்", "ta"),
    ("Telugu", "తెలుగు", "te"),
    ("Tajik", "Тоҷикӣ", "tg"),
    ("Thai", "ไทย", "th"),
    ("Turkmen", "türkmençe", "tk"),
    ("Tswana", "Setswana", "tn"),
    ("Turkish", "Türkçe", "tr"),
    ("Tatar", "Татарча", "tt"),
    ("Tamazight", "Tamazight", "tzm"),
    ("Uyghur", "ئۇيغۇرچە", "ug"),
    ("Ukrainian", "українська", "uk"),
    ("Urdu", "اُردو", "ur"),
    ("Uzbek", "Uzbek/Ўзбек", "uz"),
    ("Vietnamese", "Tiếng Việt", "vi"),
    ("Wolof", "Wolof", "wo"),
    ("Xhosa", "isiXhosa", "xh"),
    ("Yoruba", "Yoruba", "yo"),
    ("Chinese", "中文", "zh"),
    ("Zulu", "isiZulu", "zu"),
];

/// Lowercase a name and fold the Latin diacritics that occur in the
/// registry's native spellings.
fn fold(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.trim().chars().flat_map(char::to_lowercase) {
        let folded = match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
            'ç' | 'ć' | 'č' => 'c',
            'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
            'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => 'i',
            'ñ' | 'ń' | 'ň' => 'n',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ő' => 'o',
            'ř' => 'r',
            'ś' | 'š' => 's',
            'ť' => 't',
            'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => 'u',
            'ý' | 'ÿ' => 'y',
            'ź' | 'ž' | 'ż' => 'z',
            'ə' => 'a',
            'ƙ' => 'k',
            other => other,
        };
        out.push(folded);
    }
    out
}

/// Resolve a language name (English or native) to its registry code.
pub fn code_for(name: &str) -> Option<&'static str> {
    let wanted = fold(name);
    LANGUAGES
        .iter()
        .find(|(english, native, _)| fold(english) == wanted || fold(native) == wanted)
        .map(|(_, _, code)| *code)
}

/// Resolve a registry code to its English display name.
pub fn name_for(code: &str) -> Option<&'static str> {
    let wanted = code.trim().to_ascii_lowercase();
    LANGUAGES
        .iter()
        .find(|(_, _, c)| *c == wanted)
        .map(|(english, _, _)| *english)
}

/// Display name for a code, falling back to "Unknown".
pub fn display_name(code: &str) -> &'static str {
    name_for(code).unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_english_name() {
        assert_eq!(code_for("English"), Some("en"));
        assert_eq!(code_for("french"), Some("fr"));
        assert_eq!(code_for("  Spanish  "), Some("es"));
    }

    #[test]
    fn lookup_by_native_name() {
        assert_eq!(code_for("français"), Some("fr"));
        assert_eq!(code_for("español"), Some("es"));
        assert_eq!(code_for("العربية"), Some("ar"));
        assert_eq!(code_for("中文"), Some("zh"));
    }

    #[test]
    fn lookup_folds_diacritics() {
        assert_eq!(code_for("FRANCAIS"), Some("fr"));
        assert_eq!(code_for("espanol"), Some("es"));
        assert_eq!(code_for("cestina"), Some("cs"));
        assert_eq!(code_for("islenska"), Some("is"));
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(code_for("Klingon"), None);
        assert_eq!(code_for(""), None);
    }

    #[test]
    fn code_to_name() {
        assert_eq!(name_for("en"), Some("English"));
        assert_eq!(name_for("PT"), Some("Portuguese"));
        assert_eq!(name_for("xx"), None);
        assert_eq!(display_name("xx"), "Unknown");
        assert_eq!(display_name("de"), "German");
    }

    #[test]
    fn codes_are_unique() {
        let mut codes: Vec<&str> = LANGUAGES.iter().map(|(_, _, c)| *c).collect();
        codes.sort();
        let before = codes.len();
        codes.dedup();
        assert_eq!(before, codes.len());
    }
}
