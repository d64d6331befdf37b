// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for persona thoughts and disagreements.
//!
//! The system message carries the persona, its memories, any enrichment
//! notes, the session intention and the mode instructions. The user message
//! carries the writer's recent text.

use chorus_core::{ChatMessage, GenerationRequest, PartMemory, PauseEvent, Persona};
use chorus_engines::{PastFragment, RitualPattern, ThreadSource, ThreadSuggestion};
use chorus_stream::ANNOTATION_DELIMITER;

const RESPONSE_RULES: &str = "Reply with one or two short sentences in your own voice. \
Do not give advice unless asked. Do not repeat the writer's words back verbatim.";

const GROUNDING_RULES: &str = "The writer may be in distress. Slow down. Be warm, brief and \
steady. Invite one slow breath or a simple noticing of the room. Do not analyze, challenge or \
introduce new topics.";

/// Optional context gathered by the engines for this turn.
#[derive(Debug, Clone, Default)]
pub struct Enrichments {
    pub quote: Option<PastFragment>,
    pub thread: Option<ThreadSuggestion>,
    pub ritual: Option<RitualPattern>,
    /// Days the speaking persona has been quiet, when it is returning.
    pub quiet_days: Option<i64>,
}

fn ago(days: i64) -> String {
    match days {
        0 => "earlier today".to_string(),
        1 => "yesterday".to_string(),
        n => format!("{n} days ago"),
    }
}

impl Enrichments {
    pub fn is_empty(&self) -> bool {
        self.quote.is_none()
            && self.thread.is_none()
            && self.ritual.is_none()
            && self.quiet_days.is_none()
    }

    /// Short context notes, one per enrichment present.
    pub fn notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if let Some(days) = self.quiet_days {
            notes.push(format!(
                "You have been quiet for {days} days. You may acknowledge returning."
            ));
        }
        if let Some(q) = &self.quote {
            notes.push(format!(
                "The writer wrote this {}: \"{}\" You may reference it if it fits.",
                ago(q.days_ago),
                q.text
            ));
        }
        if let Some(t) = &self.thread {
            let how = match t.source {
                ThreadSource::Unfinished => "an unfinished thread",
                ThreadSource::Orphaned => "a theme that came up once and was never revisited",
            };
            notes.push(format!("There is {how} from {}: {}.", ago(t.days_ago), t.topic));
        }
        if let Some(r) = &self.ritual {
            notes.push(format!("Pattern: {}.", r.describe()));
        }
        notes
    }
}

/// Inputs for a thought prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub persona: &'a Persona,
    pub event: &'a PauseEvent,
    pub memories: &'a [PartMemory],
    pub enrichments: &'a Enrichments,
    pub intention: Option<&'a str>,
    pub grounding_active: bool,
    pub annotations: bool,
    pub max_tokens: u32,
}

fn persona_preamble(persona: &Persona) -> String {
    let mut out = if persona.system_prompt.trim().is_empty() {
        format!("You are {}, one of the writer's inner parts.", persona.name)
    } else {
        persona.system_prompt.trim().to_string()
    };
    if !persona.voice.is_empty() {
        out.push_str(&format!("\nVoice: {}", persona.voice));
    }
    if !persona.concern.is_empty() {
        out.push_str(&format!("\nWhat you care about: {}", persona.concern));
    }
    if !persona.catchphrases.is_empty() {
        out.push_str(&format!(
            "\nPhrases you sometimes use: {}",
            persona.catchphrases.join("; ")
        ));
    }
    out
}

pub fn annotation_instructions() -> String {
    format!(
        "After your reply, write the line \"{}\" and then a JSON object with \
         \"highlights\" (up to 5 short exact phrases from the writer's text worth noticing) \
         and \"ghostText\" (an optional short continuation the writer might type next).",
        ANNOTATION_DELIMITER.trim_start()
    )
}

fn user_message(event: &PauseEvent) -> ChatMessage {
    ChatMessage::user(format!(
        "The writer paused ({}). Their latest writing:\n\n{}",
        event.pause_type,
        event.recent_text.trim()
    ))
}

pub fn build_thought_request(input: &PromptInput<'_>) -> GenerationRequest {
    let mut system = persona_preamble(input.persona);

    if !input.memories.is_empty() {
        system.push_str("\n\nThings you remember:");
        for m in input.memories {
            system.push_str(&format!("\n- {}", m.content));
        }
    }
    let notes = input.enrichments.notes();
    if !notes.is_empty() {
        system.push_str("\n\nContext:");
        for note in notes {
            system.push_str(&format!("\n- {note}"));
        }
    }
    if let Some(intention) = input.intention {
        system.push_str(&format!(
            "\n\nThe writer's intention for this session: {intention}"
        ));
    }
    system.push_str("\n\n");
    system.push_str(if input.grounding_active {
        GROUNDING_RULES
    } else {
        RESPONSE_RULES
    });
    if input.annotations {
        system.push_str("\n\n");
        system.push_str(&annotation_instructions());
    }

    GenerationRequest {
        messages: vec![ChatMessage::system(system), user_message(input.event)],
        max_tokens: input.max_tokens,
    }
}

/// Prompt for `challenger` pushing back on what `speaker` just said.
pub fn build_disagreement_request(
    challenger: &Persona,
    speaker: &Persona,
    spoken: &str,
    event: &PauseEvent,
    max_tokens: u32,
) -> GenerationRequest {
    let mut system = persona_preamble(challenger);
    system.push_str(&format!(
        "\n\n{} just said: \"{spoken}\"\nYou see it differently. Gently push back in one \
         short sentence, speaking to the writer rather than to {}.",
        speaker.name, speaker.name
    ));
    GenerationRequest {
        messages: vec![ChatMessage::system(system), user_message(event)],
        max_tokens,
    }
}
