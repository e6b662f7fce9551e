//! Saved-conversation commands.

use std::error::Error;

use crate::api::ApiClient;
use crate::cli::account::friendly;
use crate::utils::prompt::confirm;

pub async fn list(client: &ApiClient) -> Result<(), Box<dyn Error>> {
    let conversations = client.conversations().await.map_err(friendly)?.conversations;
    if conversations.is_empty() {
        println!("저장된 대화가 없습니다. `maum` 으로 대화를 시작해보세요.");
        return Ok(());
    }

    for conversation in &conversations {
        let title = if conversation.title.trim().is_empty() {
            "(제목 없음)"
        } else {
            conversation.title.as_str()
        };
        println!("[{}] {}", conversation.id, title);
        if let Some(last) = &conversation.last_message {
            println!("      {}", truncate(last, 60));
        }
    }
    println!();
    println!("`maum chat --resume <ID>` 로 이어서 대화할 수 있습니다.");
    Ok(())
}

pub async fn delete(client: &ApiClient, id: u64) -> Result<(), Box<dyn Error>> {
    if !confirm(&format!("대화 {id}을(를) 삭제할까요?"))? {
        println!("취소했습니다.");
        return Ok(());
    }
    client.delete_conversation(id).await.map_err(friendly)?;
    println!("✅ 대화를 삭제했습니다.");
    Ok(())
}

pub async fn retitle(client: &ApiClient, id: u64, title: &str) -> Result<(), Box<dyn Error>> {
    client
        .update_conversation_title(id, title)
        .await
        .map_err(friendly)?;
    println!("✅ 제목을 '{title}'(으)로 바꿨습니다.");
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}…")
    }
}
