//! Files written by `bots:generate`.

use serde_json::{Value, json};

pub const LICENSE: &str = include_str!("../../templates/LICENSE.txt");

const RUBY_SCRAPER: &str = include_str!("../../templates/ruby/scraper.rb");
const PYTHON_SCRAPER: &str = include_str!("../../templates/python/scraper.py");

/// Scraper file name and contents for `language`.
pub fn scraper(language: &str) -> Option<(&'static str, &'static str)> {
    match language {
        "ruby" => Some(("scraper.rb", RUBY_SCRAPER)),
        "python" => Some(("scraper.py", PYTHON_SCRAPER)),
        _ => None,
    }
}

/// Starting manifest for a freshly generated bot.
pub fn manifest(bot_id: &str, scraper_name: &str, language: &str) -> Value {
    json!({
        "bot_id": bot_id,
        "title": bot_id,
        "description": "",
        "language": language,
        "data_type": "primary data",
        "identifying_fields": ["number"],
        "files": [scraper_name],
        "publisher": {
            "name": "",
            "url": "",
            "terms": "",
            "terms_url": ""
        },
        "frequency": "monthly"
    })
}
