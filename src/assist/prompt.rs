use crate::{
    assist::{Analysis, Analyst, AssistError, Composer, TextService},
    timeline::Pitch,
};

const MOTIF_LEN: usize = 5;
const MAX_MOTIF_LEN: usize = 16;
const MAX_OFFSET: i32 = 24;

/// [`Analyst`] backed by a [`TextService`].
pub struct PromptAnalyst<S> {
    service: S,
}

impl<S: TextService> PromptAnalyst<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    fn prompt(pitches: &[Pitch]) -> String {
        let names: Vec<_> = pitches.iter().map(|p| p.class_name()).collect();
        format!(
            "Producer mode. These notes: [{}]. Name the chord and mood in under 10 words. \
             Reply exactly as: <name> | <mood>",
            names.join(", ")
        )
    }
}

impl<S: TextService> Analyst for PromptAnalyst<S> {
    fn analyze(&self, pitches: &[Pitch]) -> Result<Analysis, AssistError> {
        let reply = self.service.complete(&Self::prompt(pitches))?;
        parse_analysis(&reply)
    }
}

/// [`Composer`] backed by a [`TextService`].
pub struct PromptComposer<S> {
    service: S,
}

impl<S: TextService> PromptComposer<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    fn prompt(description: &str) -> String {
        format!(
            "Translate vibe: \"{description}\" into a motif. Return ONLY a JSON array of \
             {MOTIF_LEN} semitone offsets (e.g. [0, 4, 7, 11, 12]). No markdown."
        )
    }
}

impl<S: TextService> Composer for PromptComposer<S> {
    fn compose(&self, description: &str) -> Result<Vec<i32>, AssistError> {
        let reply = self.service.complete(&Self::prompt(description))?;
        parse_motif(&reply)
    }
}

/// Read a `name | mood` reply.
pub fn parse_analysis(reply: &str) -> Result<Analysis, AssistError> {
    let (name, mood) = reply
        .trim()
        .split_once('|')
        .ok_or_else(|| AssistError::Malformed(format!("missing '|' in {reply:?}")))?;
    let (name, mood) = (name.trim(), mood.trim());
    if name.is_empty() || mood.is_empty() {
        return Err(AssistError::Malformed(format!("empty name or mood in {reply:?}")));
    }
    Ok(Analysis {
        suggested_name: name.to_owned(),
        mood_summary: mood.to_owned(),
    })
}

/// Read a JSON array of semitone offsets, tolerating markdown code fences.
pub fn parse_motif(reply: &str) -> Result<Vec<i32>, AssistError> {
    let cleaned = reply.replace("```json", "").replace("```", "");
    let offsets: Vec<i32> = serde_json::from_str(cleaned.trim())
        .map_err(|err| AssistError::Malformed(format!("not a list of offsets: {err}")))?;

    if offsets.is_empty() || offsets.len() > MAX_MOTIF_LEN {
        return Err(AssistError::Malformed(format!(
            "motif has {} notes, expected 1 to {MAX_MOTIF_LEN}",
            offsets.len()
        )));
    }
    if let Some(bad) = offsets.iter().find(|o| o.abs() > MAX_OFFSET) {
        return Err(AssistError::Malformed(format!(
            "offset {bad} is outside ±{MAX_OFFSET}"
        )));
    }
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn analysis_splits_on_the_first_bar() {
        let analysis = parse_analysis("  C major triad | bright, hopeful\n").unwrap();
        assert_eq!(analysis.suggested_name, "C major triad");
        assert_eq!(analysis.mood_summary, "bright, hopeful");
    }

    #[test]
    fn analysis_without_delimiter_is_malformed() {
        for reply in ["C major, happy", " | sad", "Dm7 |   "] {
            assert!(
                matches!(parse_analysis(reply), Err(AssistError::Malformed(_))),
                "{reply:?}"
            );
        }
    }

    #[test]
    fn motif_tolerates_fences() {
        assert_eq!(
            parse_motif("```json\n[0, 4, 7, 11, 12]\n```").unwrap(),
            vec![0, 4, 7, 11, 12]
        );
        assert_eq!(parse_motif("[-5, 0]").unwrap(), vec![-5, 0]);
    }

    #[test]
    fn motif_rejects_unusable_replies() {
        for reply in ["sure! here you go", "[]", "[0, 100]", "[0.5, 1]", "{\"a\": 1}"] {
            assert!(
                matches!(parse_motif(reply), Err(AssistError::Malformed(_))),
                "{reply:?}"
            );
        }
    }

    #[test]
    fn analyst_prompt_lists_note_names() {
        let seen = RefCell::new(String::new());
        let service = |prompt: &str| -> Result<String, AssistError> {
            *seen.borrow_mut() = prompt.to_owned();
            Ok("Cmaj | calm".to_owned())
        };
        let analysis = PromptAnalyst::new(service)
            .analyze(&[Pitch(60), Pitch(64), Pitch(67)])
            .unwrap();

        assert!(seen.borrow().contains("[C, E, G]"));
        assert_eq!(analysis.mood_summary, "calm");
    }

    #[test]
    fn service_errors_pass_through() {
        let composer = PromptComposer::new(|_: &str| -> Result<String, AssistError> {
            Err(AssistError::Unconfigured)
        });
        assert!(matches!(
            composer.compose("rainy day"),
            Err(AssistError::Unconfigured)
        ));
    }
}
