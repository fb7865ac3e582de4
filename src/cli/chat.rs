use anyhow::{Result, anyhow};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::{ChatService, Conversation, MessageRole};
use crate::core::AppConfig;
use crate::storage::SessionStore;

use super::startup_error;

const HELP: &str = "Commands: /new starts a new session, /exit quits";

pub async fn run(
    config: &AppConfig,
    store: &SessionStore,
    session_id: Option<String>,
) -> Result<()> {
    let service = ChatService::from_config(config).map_err(startup_error)?;

    let mut convo = match session_id {
        Some(id) => {
            let session = store
                .get_session(&id)?
                .ok_or_else(|| anyhow!("Chat session {} not found", id))?;
            Conversation::new(&service, store, session)
        }
        None => Conversation::start(&service, store, config.system_message.as_deref()),
    };

    if config.is_fallback() {
        println!("(development mode: no API key configured, replies are canned)");
    }
    println!("{}", HELP);
    print_transcript(&convo);

    let mut rl = DefaultEditor::new()?;
    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match line {
                    "/exit" | "/quit" => break,
                    "/new" => {
                        convo = Conversation::start(
                            &service,
                            store,
                            config.system_message.as_deref(),
                        );
                        println!("Started a new session");
                        continue;
                    }
                    _ => {}
                }

                let reply = convo.next_msg(line).await;
                println!("{}", reply.content);

                // The reply is already on screen, a failed save is only reported
                if let Err(err) = convo.save() {
                    eprintln!("Failed to save session: {:#}", err);
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

fn print_transcript(convo: &Conversation<'_>) {
    for msg in convo.session().messages.iter() {
        match msg.role {
            MessageRole::User => println!(">>> {}", msg.content),
            MessageRole::Assistant => println!("{}", msg.content),
            MessageRole::System => {}
        }
    }
}
