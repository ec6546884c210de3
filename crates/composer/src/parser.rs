//! Profile JSON parsing

use crate::{ComposerError, Profile, Result};

/// Parse and validate a profile from a JSON string
pub fn parse_profile(json: &str) -> Result<Profile> {
    let profile: Profile =
        serde_json::from_str(json).map_err(|e| ComposerError::ParseError(e.to_string()))?;
    profile.validate().map_err(ComposerError::ParseError)?;
    Ok(profile)
}
