//! Instruction rendering for the generation service.

use truss_core::model::{DEFAULT_HEIGHT, DEFAULT_MATERIAL, DEFAULT_SPAN, DEFAULT_TYPE};

/// Literal example of the target document, annotated with field types.
pub const TARGET_SCHEMA: &str = r#"{
  "type": "truss",
  "span": <number, meters>,
  "height": <number, meters>,
  "material": <"steel" or "concrete" etc.>,
  "nodes": [
    {"id": <int>, "x": <number>, "y": <number>, "z": <number>},
    ...
  ],
  "elements": [
    {"id": <int>, "from": <node id>, "to": <node id>},
    ...
  ],
  "supports": [
    {"node": <node id>, "type": <"pin" | "roller" | "fixed" | "guide">},
    ...
  ],
  "loads": [
    {"node": <node id>, "fx": <number>, "fy": <number>, "fz": <number>},
    ...
  ]
}"#;

/// Wrap a user description in the role statement, target schema and binding rules.
pub fn build_prompt(description: &str) -> String {
    format!(
        "You are a structural engineering modeling assistant. Convert the user's \
natural-language description into a JSON document with exactly the structure below. \
Return only JSON:
{schema}

Strict rules:
- Output JSON only, with no explanation or extra text.
- If the user does not specify a field, use these engineering defaults: type=\"{kind}\"; \
material=\"{material}\"; span={span}; height={height}.
- nodes/elements/supports/loads may be empty arrays ([]) but must be present.
- Numeric fields must be JSON numbers, not strings; ids are positive integers.
- Element keys must be \"from\" and \"to\" (lowercase).

User description: {description}
",
        schema = TARGET_SCHEMA,
        kind = DEFAULT_TYPE,
        material = DEFAULT_MATERIAL,
        span = DEFAULT_SPAN,
        height = DEFAULT_HEIGHT,
        description = description,
    )
}
