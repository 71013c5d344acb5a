use color_eyre::Result;
use std::io::{self, IsTerminal};
use watchlist_sync_config::PlexAuth;
use watchlist_sync_sources::plex::PlexCredentials;

/// Prompt for a password (masked input)
pub fn prompt_password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(prompt).map_err(|e| color_eyre::eyre::eyre!("Failed to read password: {}", e))
}

/// Turn configured auth into credentials, asking for a missing password
/// when someone is at the terminal.
pub fn complete_credentials(auth: PlexAuth) -> Result<PlexCredentials> {
    complete_credentials_with(auth, io::stdin().is_terminal(), prompt_password)
}

fn complete_credentials_with(
    auth: PlexAuth,
    interactive: bool,
    prompt: impl FnOnce(&str) -> Result<String>,
) -> Result<PlexCredentials> {
    match auth {
        PlexAuth::Token(token) => Ok(PlexCredentials::Token(token)),
        PlexAuth::Account {
            username,
            password: Some(password),
        } => Ok(PlexCredentials::Account { username, password }),
        PlexAuth::Account { username, password: None } => {
            if !interactive {
                return Err(color_eyre::eyre::eyre!(
                    "No password for Plex user {} (set PLEX_PASSWORD or use PLEX_TOKEN)",
                    username
                ));
            }
            let password = prompt(&format!("Plex password for {}: ", username))?;
            if password.is_empty() {
                return Err(color_eyre::eyre::eyre!("Empty Plex password"));
            }
            Ok(PlexCredentials::Account { username, password })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(password: Option<&str>) -> PlexAuth {
        PlexAuth::Account {
            username: "someone".to_string(),
            password: password.map(str::to_string),
        }
    }

    fn no_prompt(_: &str) -> Result<String> {
        panic!("prompt must not be shown");
    }

    #[test]
    fn test_token_passes_through() {
        let creds = complete_credentials_with(PlexAuth::Token("tok".to_string()), false, no_prompt).unwrap();
        assert!(matches!(creds, PlexCredentials::Token(t) if t == "tok"));
    }

    #[test]
    fn test_known_password_skips_prompt() {
        let creds = complete_credentials_with(account(Some("pw")), true, no_prompt).unwrap();
        assert!(matches!(creds, PlexCredentials::Account { password, .. } if password == "pw"));
    }

    #[test]
    fn test_missing_password_non_interactive_is_error() {
        let err = complete_credentials_with(account(None), false, no_prompt).unwrap_err();
        assert!(err.to_string().contains("PLEX_PASSWORD"));
    }

    #[test]
    fn test_missing_password_prompts_when_interactive() {
        let creds = complete_credentials_with(account(None), true, |prompt| {
            assert!(prompt.contains("someone"));
            Ok("typed".to_string())
        })
        .unwrap();
        assert!(matches!(creds, PlexCredentials::Account { password, .. } if password == "typed"));
    }
}
