//! Subtitle language codes → display names.
//!
//! Providers label captions with ISO 639-1 (`en`), ISO 639-2/B (`eng`) or
//! BCP 47 tags (`pt-BR`). Unknown codes are returned exactly as received.

/// Display name for a language code, if the table knows it.
///
/// Lookup is case-insensitive. A tag with a region or script subtag falls
/// back to its primary subtag when the full tag is not listed.
pub fn language_name(code: &str) -> Option<&'static str> {
    let lower = code.trim().to_ascii_lowercase().replace('_', "-");
    if let Some(name) = lookup(&lower) {
        return Some(name);
    }
    lower
        .split_once('-')
        .and_then(|(primary, _)| lookup(primary))
}

/// Normalize a provider language code, passing unknown codes through.
pub fn normalize_language(code: &str) -> String {
    language_name(code).map_or_else(|| code.to_string(), str::to_string)
}

fn lookup(code: &str) -> Option<&'static str> {
    let name = match code {
        "pt-br" => "Portuguese (Brazil)",
        "es-419" | "es-la" => "Spanish (Latin America)",
        "zh-hans" | "zh-cn" => "Chinese (Simplified)",
        "zh-hant" | "zh-tw" | "zh-hk" => "Chinese (Traditional)",
        "af" | "afr" => "Afrikaans",
        "sq" | "alb" | "sqi" => "Albanian",
        "am" | "amh" => "Amharic",
        "ar" | "ara" => "Arabic",
        "hy" | "arm" | "hye" => "Armenian",
        "az" | "aze" => "Azerbaijani",
        "eu" | "baq" | "eus" => "Basque",
        "be" | "bel" => "Belarusian",
        "bn" | "ben" => "Bengali",
        "bs" | "bos" => "Bosnian",
        "bg" | "bul" => "Bulgarian",
        "my" | "bur" | "mya" => "Burmese",
        "ca" | "cat" => "Catalan",
        "zh" | "chi" | "zho" => "Chinese",
        "hr" | "hrv" => "Croatian",
        "cs" | "cze" | "ces" => "Czech",
        "da" | "dan" => "Danish",
        "nl" | "dut" | "nld" => "Dutch",
        "en" | "eng" => "English",
        "eo" | "epo" => "Esperanto",
        "et" | "est" => "Estonian",
        "fa" | "per" | "fas" => "Persian",
        "fil" | "tl" | "tgl" => "Filipino",
        "fi" | "fin" => "Finnish",
        "fr" | "fre" | "fra" => "French",
        "gl" | "glg" => "Galician",
        "ka" | "geo" | "kat" => "Georgian",
        "de" | "ger" | "deu" => "German",
        "el" | "gre" | "ell" => "Greek",
        "gu" | "guj" => "Gujarati",
        "he" | "heb" => "Hebrew",
        "hi" | "hin" => "Hindi",
        "hu" | "hun" => "Hungarian",
        "is" | "ice" | "isl" => "Icelandic",
        "id" | "ind" => "Indonesian",
        "ga" | "gle" => "Irish",
        "it" | "ita" => "Italian",
        "ja" | "jpn" => "Japanese",
        "kn" | "kan" => "Kannada",
        "kk" | "kaz" => "Kazakh",
        "km" | "khm" => "Khmer",
        "ko" | "kor" => "Korean",
        "ku" | "kur" => "Kurdish",
        "lo" | "lao" => "Lao",
        "lv" | "lav" => "Latvian",
        "lt" | "lit" => "Lithuanian",
        "mk" | "mac" | "mkd" => "Macedonian",
        "ms" | "may" | "msa" => "Malay",
        "ml" | "mal" => "Malayalam",
        "mt" | "mlt" => "Maltese",
        "mr" | "mar" => "Marathi",
        "mn" | "mon" => "Mongolian",
        "ne" | "nep" => "Nepali",
        "no" | "nor" => "Norwegian",
        "nb" | "nob" => "Norwegian Bokmål",
        "nn" | "nno" => "Norwegian Nynorsk",
        "pa" | "pan" => "Punjabi",
        "pl" | "pol" => "Polish",
        "pt" | "por" => "Portuguese",
        "ro" | "rum" | "ron" => "Romanian",
        "ru" | "rus" => "Russian",
        "sr" | "srp" => "Serbian",
        "si" | "sin" => "Sinhala",
        "sk" | "slo" | "slk" => "Slovak",
        "sl" | "slv" => "Slovenian",
        "so" | "som" => "Somali",
        "es" | "spa" => "Spanish",
        "sw" | "swa" => "Swahili",
        "sv" | "swe" => "Swedish",
        "ta" | "tam" => "Tamil",
        "te" | "tel" => "Telugu",
        "th" | "tha" => "Thai",
        "tr" | "tur" => "Turkish",
        "uk" | "ukr" => "Ukrainian",
        "ur" | "urd" => "Urdu",
        "uz" | "uzb" => "Uzbek",
        "vi" | "vie" => "Vietnamese",
        "cy" | "wel" | "cym" => "Welsh",
        "yi" | "yid" => "Yiddish",
        "zu" | "zul" => "Zulu",
        _ => return None,
    };
    Some(name)
}
