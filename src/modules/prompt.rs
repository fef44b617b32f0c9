use crate::modules::state::{AppState, StyleTag};

// Deterministic: the same AppState always yields the same prompt, so the
// preview box and the request body can never disagree.
pub fn build_prompt(state: &AppState) -> String {
    let form = &state.form_data;
    let mut prompt: String = format!(
        "Generate a high-quality, professional logo for a brand named \"{}\".",
        form.brand_name
    );

    if !state.selected_styles.is_empty() {
        let styles: Vec<&str> = state.selected_styles.iter().map(StyleTag::label).collect();
        prompt.push_str(&format!(" The logo style must be a blend of: {}.", styles.join(", ")));
    }
    if !form.industry.is_empty() {
        prompt.push_str(&format!(" The brand is in the {} industry.", form.industry));
    }
    if !form.visuals.is_empty() {
        prompt.push_str(&format!(
            " Consider incorporating these visual elements or concepts: {}.",
            form.visuals
        ));
    }
    if !form.colors.is_empty() {
        prompt.push_str(&format!(" The preferred color palette is: {}.", form.colors));
    }
    if !form.logo_text.is_empty() {
        prompt.push_str(&format!(
            " The text to be included in the logo is: \"{}\". This could be the brand name, \
             a tagline, or a caption. Ensure it is elegantly integrated into the design.",
            form.logo_text
        ));
    }

    prompt.push_str(
        " The final logo must be iconic, memorable, and presented on a solid, \
         clean white background for maximum clarity.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_brand(brand: &str) -> AppState {
        let mut state: AppState = AppState::default();
        state.form_data.brand_name = brand.to_string();
        state
    }

    #[test]
    fn brand_clause_is_always_present() {
        let prompt: String = build_prompt(&state_with_brand("Acme"));
        assert!(prompt.contains("a brand named \"Acme\"."));
        assert!(prompt.contains("solid, clean white background"));
    }

    #[test]
    fn optional_clauses_track_their_fields() {
        let mut state: AppState = state_with_brand("Acme");
        let bare: String = build_prompt(&state);
        assert!(!bare.contains("industry"));
        assert!(!bare.contains("visual elements"));
        assert!(!bare.contains("color palette"));
        assert!(!bare.contains("text to be included"));
        assert!(!bare.contains("blend of"));

        state.form_data.industry = "Artisan Coffee Roaster".to_string();
        state.form_data.visuals = "a subtle leaf".to_string();
        state.form_data.colors = "earth tones".to_string();
        state.form_data.logo_text = "Acme Coffee".to_string();

        let full: String = build_prompt(&state);
        assert!(full.contains("The brand is in the Artisan Coffee Roaster industry."));
        assert!(full.contains("visual elements or concepts: a subtle leaf."));
        assert!(full.contains("The preferred color palette is: earth tones."));
        assert!(full.contains("The text to be included in the logo is: \"Acme Coffee\"."));
    }

    #[test]
    fn styles_appear_in_selection_order() {
        let mut state: AppState = state_with_brand("Acme");
        state.toggle_style(StyleTag::Modern);
        state.toggle_style(StyleTag::Vintage);
        let prompt: String = build_prompt(&state);
        assert!(prompt.contains("a blend of: Modern, Vintage."));
    }

    #[test]
    fn same_input_same_output() {
        let mut state: AppState = state_with_brand("Acme");
        state.toggle_style(StyleTag::Geometric);
        assert_eq!(build_prompt(&state), build_prompt(&state));
    }
}
