use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn lang_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z]{2,3}([-_][A-Za-z0-9]{2,8})*$").expect("language code pattern is valid")
    })
}

/// Check a BCP-47-ish language code such as `en`, `pt-BR` or `zh_Hant`
pub fn validate_lang_code(code: &str) -> Result<String, String> {
    let code = code.trim();
    if lang_code_pattern().is_match(code) {
        Ok(code.to_string())
    } else {
        Err(format!("'{}' is not a valid language code", code))
    }
}

/// Split a comma separated target list, dropping blanks
pub fn parse_target_list(raw: &str) -> Result<Vec<String>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(validate_lang_code)
        .collect()
}

/// Sibling file named after the target language: `locales/en.ts` -> `locales/fr.ts`
pub fn output_path_for(input_file: &Path, target_lang: &str) -> PathBuf {
    let file_name = match input_file.extension() {
        Some(ext) => format!("{}.{}", target_lang, ext.to_string_lossy()),
        None => target_lang.to_string(),
    };
    match input_file.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}
