use std::collections::HashMap;
use std::sync::OnceLock;

/// Mode used when a document has no known extension
pub const DEFAULT_MODE: &str = "text";
pub const DEFAULT_THEME: &str = "dawn";
pub const DEFAULT_BINDING: &str = "none";

const MODES: &[(&str, &str)] = &[
    ("as", "actionscript"),
    ("txt", "asciidoc"),
    ("s", "assembly_x86"),
    ("S", "assembly_x86"),
    ("asm", "assembly_x86"),
    ("cpp", "c_cpp"),
    ("hpp", "c_cpp"),
    ("cx", "c_cpp"),
    ("hx", "c_cpp"),
    ("c", "c_cpp"),
    ("h", "c_cpp"),
    ("clj", "clojure"),
    ("cljs", "clojure"),
    ("edn", "clojure"),
    ("coffee", "coffee"),
    ("cs", "csharp"),
    ("css", "css"),
    ("dart", "dart"),
    ("d", "d"),
    ("erl", "erlang"),
    ("hrl", "erlang"),
    ("go", "golang"),
    ("hs", "haskell"),
    ("lhs", "haskell"),
    ("html", "html"),
    ("htm", "html"),
    ("java", "java"),
    ("js", "javascript"),
    ("json", "json"),
    ("jsp", "jsp"),
    ("jl", "julia"),
    ("tex", "latex"),
    ("less", "less"),
    ("lisp", "lisp"),
    ("lsp", "lisp"),
    ("l", "lisp"),
    ("cl", "lisp"),
    ("fasl", "lisp"),
    ("lua", "lua"),
    ("mk", "makefile"),
    ("md", "markdown"),
    ("m", "matlab"),
    ("ml", "ocaml"),
    ("pl", "perl"),
    ("pm", "perl"),
    ("t", "perl"),
    ("pod", "perl"),
    ("php", "php"),
    ("ps", "powershell"),
    ("py", "python"),
    ("rb", "ruby"),
    ("rs", "rust"),
    ("rlib", "rust"),
    ("sass", "sass"),
    ("scss", "sass"),
    ("scala", "scala"),
    ("scm", "scheme"),
    ("ss", "scheme"),
    ("sh", "sh"),
    ("bash", "sh"),
    ("sql", "sql"),
    ("vb", "vbscript"),
    ("xml", "xml"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
];

const THEMES: &[(&str, &str)] = &[
    ("ambiance", "Ambiance"),
    ("chaos", "Chaos"),
    ("chrome", "Chrome"),
    ("clouds", "Clouds"),
    ("clouds_midnight", "Clouds/Midnight"),
    ("cobalt", "Cobalt"),
    ("crimson_editor", "Crimson"),
    ("dawn", "Dawn"),
    ("dreamweaver", "Dreamweaver"),
    ("eclipse", "Eclipse"),
    ("github", "Github"),
    ("idle_fingers", "Idle Fingers"),
    ("katzenmilch", "Katzenmilch"),
    ("kuroir", "Kurior"),
    ("merbivore", "Merbivore"),
    ("merbivore_soft", "Merbivore Soft"),
    ("mono_industrial", "Mono Industrial"),
    ("monokai", "Monokai"),
    ("pastel_on_dark", "Pastel on Dark"),
    ("solarized_dark", "Solarized Dark"),
    ("solarized_light", "Solarized Light"),
    ("terminal", "Terminal"),
    ("textmate", "Textmate"),
    ("tomorrow", "Tomorrow"),
    ("tomorrow_night_blue", "Tomorrow Night Blue"),
    ("tomorrow_night_bright", "Tomorrow Night Bright"),
    ("tomorrow_night_eighties", "Tomorrow Night Eighties"),
    ("tomorrow_night", "Tomorrow Night"),
    ("twilight", "Twilight"),
    ("vibrant_ink", "Vibrant Ink"),
    ("xcode", "XCode"),
];

const KEYMAPS: &[(&str, &str)] = &[
    ("none", "Standard"),
    ("vim", "Vim"),
    ("emacs", "Emacs"),
];

static MODE_TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
static THEME_TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
static KEYMAP_TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

/// Extension -> syntax mode id
pub fn modes() -> &'static HashMap<&'static str, &'static str> {
    MODE_TABLE.get_or_init(|| MODES.iter().copied().collect())
}

/// Theme id -> display name
pub fn themes() -> &'static HashMap<&'static str, &'static str> {
    THEME_TABLE.get_or_init(|| THEMES.iter().copied().collect())
}

/// Key binding id -> display name
pub fn keymaps() -> &'static HashMap<&'static str, &'static str> {
    KEYMAP_TABLE.get_or_init(|| KEYMAPS.iter().copied().collect())
}

/// Resolve the syntax mode for a document path.
///
/// The extension is whatever follows the last `.` of the final path segment, matched
/// case sensitively.
pub fn mode_for_path(document_id: &str) -> &'static str {
    let file_name = document_id.rsplit('/').next().unwrap_or(document_id);
    file_name
        .rsplit_once('.')
        .and_then(|(_, ext)| modes().get(ext).copied())
        .unwrap_or(DEFAULT_MODE)
}

/// Keyboard handler to install for a binding, `None` for the standard one.
pub fn keyboard_handler(binding: &str) -> Option<&'static str> {
    match binding {
        DEFAULT_BINDING => None,
        other => keymaps().get_key_value(other).map(|(id, _)| *id),
    }
}
