//! Checks that the shipped prompt templates load and render for every
//! post type.

use postforge_core::{assemble_user_prompt, PostType, PromptLibrary, DEFAULT_AUDIENCE};

fn shipped_prompts() -> PromptLibrary {
    PromptLibrary::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../prompts"))
}

#[test]
fn test_system_prompt_loads_nonempty() {
    let system = shipped_prompts().system_prompt().unwrap();
    assert!(!system.is_empty());
}

#[test]
fn test_every_post_type_template_renders_with_topic() {
    let library = shipped_prompts();
    let topic = "Why SME teams fail at AI adoption after pilot success";
    for post_type in PostType::ALL {
        let template = library.post_template(post_type).unwrap();
        let prompt = assemble_user_prompt(
            &template,
            topic,
            DEFAULT_AUDIENCE,
            "Build authority with SME founders",
            "Context snippet.",
            Some("Start with a concrete case."),
        )
        .unwrap();
        assert!(prompt.contains(topic));
        assert!(!prompt.contains("{{"));
        assert!(prompt.contains("Additional angle instruction:"));
    }
}
