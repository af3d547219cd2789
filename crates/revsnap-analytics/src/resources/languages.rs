//! Per-language capability table for phrase extraction.
//!
//! Each supported language maps to the extraction pipeline served by the NLP
//! service, the words a candidate phrase may not start with, and the words
//! that carry no information on their own. Supporting another language is a
//! matter of adding an entry to [`LANGUAGES`].

/// Capability bundle for one review language.
#[derive(Debug, PartialEq, Eq)]
pub struct LanguageProfile {
    /// Language code as stored on reviews, e.g. `de`.
    pub code: &'static str,
    /// Pipeline identifier understood by the extraction service.
    pub resource_id: &'static str,
    /// Words a theme phrase must not start with.
    pub stop_words: &'static [&'static str],
    /// Low-information words; a phrase made mostly of these is dropped.
    pub generic_words: &'static [&'static str],
}

impl LanguageProfile {
    #[must_use]
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word)
    }

    #[must_use]
    pub fn is_generic_word(&self, word: &str) -> bool {
        self.generic_words.contains(&word)
    }
}

/// Low-information phrases rejected in every language.
pub const GENERIC_PHRASES: &[&str] = &[
    "the company",
    "this company",
    "the product",
    "this product",
    "the service",
    "this service",
    "the app",
    "this app",
    "my account",
    "my experience",
    "the time",
    "this time",
];

pub const LANGUAGES: &[LanguageProfile] = &[
    LanguageProfile {
        code: "en",
        resource_id: "en_core_web_sm",
        stop_words: &[
            "this", "that", "they", "them", "their", "these", "those", "what", "which", "who",
            "whom", "whose", "when", "where", "why", "how", "there", "here", "your", "yours",
            "mine", "ours", "theirs",
        ],
        generic_words: &[
            "the", "a", "an", "my", "our", "your", "this", "that", "it", "its", "company",
            "product", "products", "service", "app", "account", "experience", "time", "thing",
            "things", "everything", "something", "anything", "lot", "way",
        ],
    },
    LanguageProfile {
        code: "de",
        resource_id: "de_core_news_sm",
        stop_words: &[
            "sich", "der", "die", "das", "den", "dem", "des", "ein", "eine", "einer", "eines",
            "einem", "einen", "ich", "mich", "mir", "du", "dich", "dir", "sie", "ihm", "ihn",
            "wir", "uns", "ihr", "euch", "ihnen",
        ],
        generic_words: &[
            "mein", "meine", "unser", "unsere", "firma", "unternehmen", "produkt", "service",
            "app", "konto", "erfahrung", "zeit", "sache", "alles", "etwas",
        ],
    },
    LanguageProfile {
        code: "fr",
        resource_id: "fr_core_news_sm",
        stop_words: &[
            "le", "la", "les", "un", "une", "des", "ce", "cet", "cette", "ces", "je", "tu", "il",
            "elle", "nous", "vous", "ils", "elles", "moi", "toi", "lui", "eux",
        ],
        generic_words: &[
            "mon", "ma", "mes", "notre", "entreprise", "société", "produit", "service",
            "application", "compte", "expérience", "temps", "chose", "tout",
        ],
    },
    LanguageProfile {
        code: "es",
        resource_id: "es_core_news_sm",
        stop_words: &[
            "el", "la", "los", "las", "un", "una", "unos", "unas", "este", "esta", "estos",
            "estas", "ese", "esa", "esos", "esas", "yo", "tu", "él", "ella", "nosotros",
            "vosotros", "ellos", "ellas", "mi", "mis", "su", "sus",
        ],
        generic_words: &[
            "de", "del", "empresa", "compañía", "producto", "servicio", "aplicación", "cuenta",
            "experiencia", "tiempo", "cosa", "todo",
        ],
    },
    LanguageProfile {
        code: "it",
        resource_id: "it_core_news_sm",
        stop_words: &[
            "il", "lo", "la", "gli", "le", "uno", "una", "questo", "questa", "questi", "queste",
            "io", "tu", "lui", "lei", "noi", "voi", "loro",
        ],
        generic_words: &[
            "mio", "mia", "di", "del", "azienda", "società", "prodotto", "servizio", "app",
            "account", "esperienza", "tempo", "cosa", "tutto",
        ],
    },
    LanguageProfile {
        code: "pt",
        resource_id: "pt_core_news_sm",
        stop_words: &[
            "o", "a", "os", "as", "um", "uma", "uns", "umas", "este", "esta", "esse", "essa",
            "eu", "tu", "ele", "ela", "nós", "eles", "elas", "meu", "minha",
        ],
        generic_words: &[
            "de", "do", "da", "empresa", "produto", "serviço", "aplicativo", "conta",
            "experiência", "tempo", "coisa", "tudo",
        ],
    },
    LanguageProfile {
        code: "nl",
        resource_id: "nl_core_news_sm",
        stop_words: &[
            "de", "het", "een", "dit", "dat", "deze", "die", "ik", "jij", "hij", "zij", "wij",
            "jullie", "ze", "mij", "jou",
        ],
        generic_words: &[
            "mijn", "ons", "onze", "bedrijf", "product", "service", "app", "account",
            "ervaring", "tijd", "ding", "alles",
        ],
    },
    LanguageProfile {
        code: "da",
        resource_id: "da_core_news_sm",
        stop_words: &[
            "den", "det", "de", "en", "et", "denne", "dette", "disse", "jeg", "du", "han", "hun",
            "vi", "mig", "dig", "dem",
        ],
        generic_words: &[
            "min", "mit", "mine", "firma", "virksomhed", "produkt", "service", "app", "konto",
            "oplevelse", "tid", "ting", "alt",
        ],
    },
    LanguageProfile {
        code: "sv",
        resource_id: "sv_core_news_sm",
        stop_words: &[
            "den", "det", "de", "en", "ett", "denna", "detta", "dessa", "jag", "du", "han", "hon",
            "vi", "ni", "mig", "dig", "dem",
        ],
        generic_words: &[
            "min", "mitt", "mina", "företag", "företaget", "produkt", "tjänst", "app", "konto",
            "upplevelse", "tid", "sak", "allt",
        ],
    },
    LanguageProfile {
        code: "no",
        resource_id: "nb_core_news_sm",
        stop_words: &[
            "den", "det", "de", "en", "et", "ei", "denne", "dette", "disse", "jeg", "du", "han",
            "hun", "vi", "meg", "deg", "dem",
        ],
        generic_words: &[
            "min", "mitt", "mine", "firma", "selskap", "produkt", "tjeneste", "app", "konto",
            "opplevelse", "tid", "ting", "alt",
        ],
    },
    LanguageProfile {
        code: "fi",
        resource_id: "fi_core_news_sm",
        stop_words: &[
            "tämä", "tuo", "se", "nämä", "nuo", "ne", "minä", "sinä", "hän", "me", "te", "he",
        ],
        generic_words: &[
            "minun", "yritys", "tuote", "palvelu", "sovellus", "tili", "kokemus", "aika", "asia",
            "kaikki",
        ],
    },
    LanguageProfile {
        code: "pl",
        resource_id: "pl_core_news_sm",
        stop_words: &[
            "ten", "ta", "to", "ci", "te", "tamten", "ja", "ty", "on", "ona", "ono", "my", "wy",
            "oni", "one", "mój", "moja",
        ],
        generic_words: &[
            "firma", "firmy", "produkt", "usługa", "aplikacja", "konto", "doświadczenie", "czas",
            "rzecz", "wszystko",
        ],
    },
    LanguageProfile {
        code: "ro",
        resource_id: "ro_core_news_sm",
        stop_words: &[
            "un", "o", "acest", "această", "acei", "aceste", "eu", "tu", "el", "ea", "noi", "voi",
            "ei", "ele", "meu", "mea",
        ],
        generic_words: &[
            "companie", "compania", "firma", "produs", "serviciu", "aplicație", "cont",
            "experiență", "timp", "lucru", "tot",
        ],
    },
];

/// Capability bundle for a language code, if the language is supported.
#[must_use]
pub fn profile(code: &str) -> Option<&'static LanguageProfile> {
    LANGUAGES.iter().find(|p| p.code == code)
}
