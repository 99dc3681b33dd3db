//! Response schema declarations sent with each request
//!
//! These use the generation service's schema dialect (upper-case type names).
//! The service is asked to conform but the reply is still validated locally.

use crate::types::Mode;
use serde_json::{Value, json};

pub fn roast_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "archetype": {
                "type": "STRING",
                "description": "A funny, rude, or savage archetype name for the coder (e.g., 'The Spaghetti Monster', 'Copy-Paste Warrior')."
            },
            "score": {
                "type": "INTEGER",
                "description": "A code quality score from 0 (garbage) to 100 (god-tier)."
            },
            "emoji": {
                "type": "STRING",
                "description": "A single emoji representing the code vibe."
            },
            "image_prompt": {
                "type": "STRING",
                "description": "A short, vivid visual description of the character for an AI image generator. MUST follow the defined Visual Archetypes."
            },
            "theme_color": {
                "type": "STRING",
                "description": "A Hex color code (e.g., #FF0000) that fits the archetype's vibe (Red for bad, Green for good, Purple for chaotic, etc)."
            },
            "quote": {
                "type": "STRING",
                "description": "A short, punchy, savage one-liner summary."
            },
            "stats": {
                "type": "OBJECT",
                "properties": {
                    "sanity": { "type": "INTEGER", "description": "0-100 rating of logic sanity." },
                    "efficiency": { "type": "INTEGER", "description": "0-100 rating of performance." },
                    "style": { "type": "INTEGER", "description": "0-100 rating of code style." }
                },
                "required": ["sanity", "efficiency", "style"]
            },
            "details": {
                "type": "STRING",
                "description": "A Markdown formatted paragraph roasting the code in detail."
            }
        },
        "required": ["archetype", "score", "emoji", "image_prompt", "theme_color", "quote", "stats", "details"]
    })
}

pub fn fix_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "mode": { "type": "STRING", "enum": ["fix"] },
            "fixed_code": { "type": "STRING", "description": "The refactored, clean, production-ready code." },
            "explanation": { "type": "STRING", "description": "Brief, helpful explanation of what you fixed." },
            "new_rank": { "type": "STRING", "description": "A new, complimentary title (e.g., 'Clean Code Paladin')." }
        },
        "required": ["mode", "fixed_code", "explanation", "new_rank"]
    })
}

pub fn schema_for_mode(mode: Mode) -> Value {
    match mode {
        Mode::Roast => roast_schema(),
        Mode::Fix => fix_schema(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required(schema: &Value) -> Vec<&str> {
        schema["required"]
            .as_array()
            .map(|fields| fields.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_every_declared_property_is_required() {
        for mode in [Mode::Roast, Mode::Fix] {
            let schema = schema_for_mode(mode);
            let properties = schema["properties"].as_object().expect("properties");
            let required = required(&schema);
            assert_eq!(properties.len(), required.len(), "{mode} schema");
            for name in properties.keys() {
                assert!(required.contains(&name.as_str()), "{name} not required");
            }
        }
    }

    #[test]
    fn test_fix_schema_pins_mode() {
        assert_eq!(fix_schema()["properties"]["mode"]["enum"], json!(["fix"]));
    }
}
