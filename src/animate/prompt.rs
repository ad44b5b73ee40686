//! Prompt construction for style transfer requests.

use super::style::Style;

const TASK_FRAMING: &str = "Analyze this input video. Identify the main person(s), their movements, facial expressions, and actions, as well as the key background elements.

Generate a new video with the same duration, rhythm, and sequence of actions as the original.";

const STYLIZATION_DIRECTIVES: &str = "Stylization Directives:
- Characters: Transform people into cartoon characters corresponding to the chosen style, simplifying their features but maintaining recognizable characteristics (hair color, clothing, build). Facial expressions should be subtly exaggerated to fit the animation style.
- Backgrounds and Objects: Redraw the environment and objects to match the aesthetics of the selected style.
- Movement: Ensure that the movement is fluid and natural within the conventions of the animation style. Avoid visual artifacts or inconsistencies between frames. Temporal coherence is crucial.
- Color and Light: Apply a color palette and lighting scheme that are characteristic of the chosen animation style.";

/// Render the generation instruction for a style.
///
/// Pure: the same style always yields a byte-identical prompt.
pub fn build_prompt(style: Style) -> String {
    format!(
        "{}\n\nApply the following visual style: {}.\n\n{}",
        TASK_FRAMING,
        style.label(),
        STYLIZATION_DIRECTIVES
    )
}
