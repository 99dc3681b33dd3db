//! System instructions for the two generation modes

use std::fmt::Write;

/// A persona the roast may assign, tied to the flaw it punishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualArchetype {
    pub name: &'static str,
    pub flaw: &'static str,
    pub scene: &'static str,
}

/// The fixed set of visual archetypes the image prompt must map onto
pub const ARCHETYPES: [VisualArchetype; 5] = [
    VisualArchetype {
        name: "The Spaghetti Chef",
        flaw: "nested loops/messy logic",
        scene: "A chaotic Italian chef entangled in glowing neon pasta cables.",
    },
    VisualArchetype {
        name: "The Arsonist",
        flaw: "dangerous/insecure code",
        scene: "A maniacal raccoon standing in front of a burning server room.",
    },
    VisualArchetype {
        name: "The Fossil",
        flaw: "outdated syntax/old libraries",
        scene: "A dusty skeleton coding on a stone tablet in a museum.",
    },
    VisualArchetype {
        name: "The Clown",
        flaw: "silly logic errors",
        scene: "A sad cyber-clown trying to juggle too many error messages.",
    },
    VisualArchetype {
        name: "The Snail",
        flaw: "slow/inefficient code",
        scene: "A futuristic racing snail falling asleep at a keyboard.",
    },
];

const ROAST_PERSONA: &str = r#"You are GitMad, a legendary, cynical, and ruthless senior software engineer from the 90s hacker scene.
Your job is to roast the code provided by the user and generate an RPG-style "Character Card".

Guidelines:
1. Be savage but accurate.
2. Point out specific logic errors and bad practices.
3. Pick a "theme_color" that matches the severity of the code quality.

4. IMAGE PROMPT GENERATION RULES (STRICT):
Do not default to horror or zombie imagery. You MUST map the specific code error to one of these distinct Visual Archetypes:
"#;

const FIX_PERSONA: &str = r#"You are the "Benevolent Clean Code Architect".
Your goal is to take the user's messy code and refactor it into clean, efficient, production-ready code.
1. Ignore the previous roast persona. Be helpful and constructive.
2. Fix logic errors, improve naming, and optimize performance.
3. Provide a brief explanation of the changes.
4. Assign a new, cool rank title.
"#;

/// System instruction for ROAST mode
///
/// `avoid` names the archetype handed out last time, if any.
pub fn roast_instruction(avoid: Option<&str>) -> String {
    let mut instruction = String::from(ROAST_PERSONA);
    instruction.push('\n');

    for archetype in &ARCHETYPES {
        let _ = writeln!(
            instruction,
            "- {}: (For {}) -> Visual: {}",
            archetype.name, archetype.flaw, archetype.scene
        );
    }

    instruction.push_str(
        "\nRule: Analyze the code first. Pick the Archetype that best matches the specific flaw. Never use the same archetype twice in a row.\n",
    );

    if let Some(previous) = avoid {
        let _ = writeln!(
            instruction,
            "The previous roast used \"{previous}\". Do not use it again for this one."
        );
    }

    instruction
}

/// System instruction for FIX mode
pub fn fix_instruction() -> String {
    FIX_PERSONA.to_string()
}
