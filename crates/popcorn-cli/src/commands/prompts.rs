use color_eyre::Result;
use dialoguer::{Confirm, Input, Password};
use popcorn_models::{MAX_USER_RATING, MIN_USER_RATING};

/// Prompt for a secret (masked input)
pub fn prompt_password(prompt: &str) -> Result<String> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))
}

/// Prompt for yes/no with a default
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read confirmation: {}", e))
}

/// Prompt for a 1-10 rating, asking again until the answer is valid
pub fn prompt_rating(prompt: &str, default: Option<u8>) -> Result<u8> {
    let mut input = Input::<u8>::new()
        .with_prompt(format!("{} ({}-{})", prompt, MIN_USER_RATING, MAX_USER_RATING))
        .validate_with(|rating: &u8| -> Result<(), String> {
            if (MIN_USER_RATING..=MAX_USER_RATING).contains(rating) {
                Ok(())
            } else {
                Err(format!("Enter a number from {} to {}", MIN_USER_RATING, MAX_USER_RATING))
            }
        });

    if let Some(default_value) = default {
        input = input.default(default_value);
    }

    input
        .interact_text()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read rating: {}", e))
}
