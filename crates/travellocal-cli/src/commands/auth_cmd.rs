use crate::auth::keychain_session;
use crate::cli::AuthCommands;
use crate::error::CliError;

pub fn run_auth(command: AuthCommands) -> Result<(), CliError> {
    let session = keychain_session();
    match command {
        AuthCommands::SetToken { token } => {
            session.clear()?;
            session.store_access_token(&token)?;
            match session.token_subject()? {
                Some(subject) => println!("Access token stored for user {subject}"),
                None => println!("Access token stored"),
            }
            Ok(())
        }
        AuthCommands::Status => {
            if !session.is_signed_in()? {
                println!("Not signed in.");
                return Ok(());
            }
            match session.cached_identity()? {
                Some(identity) => {
                    println!("Signed in as {} (id {})", identity.user_name, identity.user_id);
                }
                None => match session.token_subject()? {
                    Some(subject) => println!("Signed in (token subject {subject})"),
                    None => println!("Signed in"),
                },
            }
            Ok(())
        }
        AuthCommands::Logout => {
            session.clear()?;
            println!("Signed out");
            Ok(())
        }
    }
}
