//! User-facing strings for the terminal shell.
//!
//! Built once at startup and passed by reference; the active language is
//! chosen per lookup so switching languages never mutates the table.

use std::collections::HashMap;

type Table = HashMap<&'static str, &'static str>;

const EN: &[(&str, &str)] = &[
    ("title", "Prompt Cataloger 3000 - ACME"),
    ("select_source_file", "Source file (existing CSV): "),
    ("select_target_file", "Target file (created if missing): "),
    ("file_not_found", "File not found!"),
    ("no_file_selected", "No file selected."),
    ("source_header", "SOURCE: "),
    ("target_header", "TARGET: "),
    ("nsfw", "NSFW"),
    ("mi", "MI"),
    ("unset", "unset"),
    ("at_first", "Already at the first prompt."),
    ("at_last", "Already at the last prompt."),
    ("saved", "Progress saved."),
    ("unknown_command", "Unknown command, type 'h' for help:"),
    ("invalid_label", "Rejected:"),
    ("lang_changed", "Language changed."),
    ("unknown_lang", "Unknown language:"),
    (
        "help",
        "Commands:\n  n, next, <enter>   save and go to the next prompt\n  p, prev            save and go to the previous prompt\n  s <0-100>          set NSFW (negative clears it)\n  m <0|1>            set MI (negative clears it)\n  lang <code>        switch language (en, es)\n  q, quit            save and exit",
    ),
];

const ES: &[(&str, &str)] = &[
    ("title", "Catalogador de Prompts 3000 - ACME"),
    ("select_source_file", "Archivo de origen (CSV existente): "),
    ("select_target_file", "Archivo de destino (se crea si no existe): "),
    ("file_not_found", "¡Archivo no encontrado!"),
    ("no_file_selected", "Ningún archivo seleccionado."),
    ("source_header", "ORIGEN: "),
    ("target_header", "DESTINO: "),
    ("unset", "sin valor"),
    ("at_first", "Ya está en el primer prompt."),
    ("at_last", "Ya está en el último prompt."),
    ("saved", "Progreso guardado."),
    ("unknown_command", "Comando desconocido, escriba 'h' para ayuda:"),
    ("invalid_label", "Rechazado:"),
    ("lang_changed", "Idioma cambiado."),
    ("unknown_lang", "Idioma desconocido:"),
    (
        "help",
        "Comandos:\n  n, next, <enter>   guardar e ir al siguiente prompt\n  p, prev            guardar e ir al prompt anterior\n  s <0-100>          fijar NSFW (negativo lo borra)\n  m <0|1>            fijar MI (negativo lo borra)\n  lang <código>      cambiar idioma (en, es)\n  q, quit            guardar y salir",
    ),
];

/// Language code whose table backs every missing key.
pub const FALLBACK_LANG: &str = "en";

/// Immutable language -> key -> text table.
#[derive(Debug, Clone)]
pub struct Resources {
    tables: HashMap<&'static str, Table>,
}

impl Resources {
    /// The built-in English and Spanish tables.
    pub fn builtin() -> Self {
        let tables = [("en", EN), ("es", ES)]
            .into_iter()
            .map(|(lang, entries)| (lang, entries.iter().copied().collect()))
            .collect();
        Self { tables }
    }

    pub fn has_lang(&self, lang: &str) -> bool {
        self.tables.contains_key(lang)
    }

    /// Sorted language codes.
    pub fn languages(&self) -> Vec<&'static str> {
        let mut langs: Vec<_> = self.tables.keys().copied().collect();
        langs.sort_unstable();
        langs
    }

    /// Look up `key` in `lang`, falling back to English, then to the key.
    pub fn text<'a>(&'a self, lang: &str, key: &'a str) -> &'a str {
        let found = self
            .tables
            .get(lang)
            .and_then(|table| table.get(key))
            .or_else(|| {
                self.tables
                    .get(FALLBACK_LANG)
                    .and_then(|table| table.get(key))
            });
        match found {
            Some(text) => *text,
            None => {
                tracing::warn!(lang, key, "missing text resource");
                key
            }
        }
    }
}
