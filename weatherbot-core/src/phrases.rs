//! Prompt wording, rotated for variety.
//!
//! Selection takes an explicit randomness source so callers (and tests)
//! control determinism.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptCategory {
    /// Ask the user which city they mean.
    ProvideCity,
    /// Ask for a disambiguating country or state.
    ProvideArea,
    /// Static help for the About intent.
    HowTo,
}

impl PromptCategory {
    fn options(&self) -> &'static [&'static str] {
        match self {
            PromptCategory::ProvideCity => &[
                "Please provide a city",
                "What is your city?",
                "In which city?",
            ],
            PromptCategory::ProvideArea => &[
                "I found several places with this name. Could you provide country or state?",
            ],
            PromptCategory::HowTo => &[
                "I'm a weather bot. I can provide weather forecast and historical data. \
                 For example, ask \"Weather in Berlin?\", or \"Weather in Moscow on 1st of January?\"",
                "I'm a bot. I can provide historical weather data and forecasts. \
                 For example, ask \"What was the weather in Chicago yesterday?\", \
                 or \"Weather in Furnace Creek?\"",
            ],
        }
    }
}

/// Pick one phrase from the category's rotation.
pub fn choose<R: Rng + ?Sized>(category: PromptCategory, rng: &mut R) -> &'static str {
    let options = category.options();
    options[rng.random_range(0..options.len())]
}
