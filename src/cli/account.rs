//! Account commands: login, register, logout, whoami, and profile management.

use std::error::Error;

use crate::api::{ApiClient, ApiError};
use crate::core::session::AuthSession;
use crate::core::store::SessionStore;
use crate::utils::prompt::{confirm, prompt_line, prompt_password};
use crate::utils::validation::{validate_password, validate_password_confirmation};

pub async fn login(client: ApiClient) -> Result<(), Box<dyn Error>> {
    let email = prompt_line("이메일: ")?;
    let password = prompt_password("비밀번호: ")?;

    let mut session = AuthSession::new(client);
    if session.login(&email, &password).await {
        let name = session
            .user
            .as_ref()
            .map(|user| user.display_name().to_string())
            .unwrap_or_default();
        println!("✅ 로그인되었습니다. 반가워요, {name}님!");
        Ok(())
    } else {
        eprintln!("❌ {}", session.error.as_deref().unwrap_or("로그인에 실패했습니다."));
        std::process::exit(1);
    }
}

pub async fn register(client: ApiClient) -> Result<(), Box<dyn Error>> {
    let email = prompt_line("이메일: ")?;
    let name = prompt_line("이름 (건너뛰려면 Enter): ")?;
    let password = prompt_password("비밀번호 (6자 이상): ")?;
    let confirmation = prompt_password("비밀번호 확인: ")?;

    let name = (!name.trim().is_empty()).then(|| name.trim().to_string());
    let mut session = AuthSession::new(client);
    if session
        .register(&email, &password, &confirmation, name.as_deref())
        .await
    {
        println!("✅ 가입이 완료되었습니다. 환영해요!");
        Ok(())
    } else {
        eprintln!("❌ {}", session.error.as_deref().unwrap_or("가입에 실패했습니다."));
        std::process::exit(1);
    }
}

pub async fn logout(client: ApiClient) -> Result<(), Box<dyn Error>> {
    let mut session = AuthSession::new(client);
    session.logout().await;
    println!("✅ 로그아웃되었습니다.");
    Ok(())
}

pub async fn whoami(client: ApiClient) -> Result<(), Box<dyn Error>> {
    if client.store().token().is_none() {
        println!("로그인되어 있지 않습니다. 익명으로 이용 중입니다.");
        return Ok(());
    }
    let mut session = AuthSession::new(client);
    session.load_user().await;
    match &session.user {
        Some(user) => {
            println!("{} <{}>", user.display_name(), user.email);
            Ok(())
        }
        None => {
            eprintln!("⚠️  저장된 세션이 더 이상 유효하지 않습니다. 다시 로그인해주세요.");
            std::process::exit(1);
        }
    }
}

pub async fn profile(client: &ApiClient) -> Result<(), Box<dyn Error>> {
    let profile = client.profile().await.map_err(friendly)?;
    let user = profile.user;
    println!("이름:   {}", user.display_name());
    println!("이메일: {}", user.email);
    Ok(())
}

pub async fn set_name(client: &ApiClient, name: &str) -> Result<(), Box<dyn Error>> {
    let updated = client.update_profile(name).await.map_err(friendly)?;
    println!("✅ 이름을 '{}'(으)로 바꿨습니다.", updated.user.display_name());
    Ok(())
}

pub async fn change_password(client: &ApiClient) -> Result<(), Box<dyn Error>> {
    let current = prompt_password("현재 비밀번호: ")?;
    let new = prompt_password("새 비밀번호 (6자 이상): ")?;
    let confirmation = prompt_password("새 비밀번호 확인: ")?;

    if let Err(err) =
        validate_password(&new).and_then(|_| validate_password_confirmation(&new, &confirmation))
    {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }

    client
        .change_password(&current, &new)
        .await
        .map_err(friendly)?;
    println!("✅ 비밀번호를 바꿨습니다.");
    Ok(())
}

pub async fn delete_account(client: &ApiClient) -> Result<(), Box<dyn Error>> {
    eprintln!("⚠️  계정을 삭제하면 모든 대화와 감정 기록이 사라지며 되돌릴 수 없습니다.");
    if !confirm("정말 삭제할까요?")? {
        println!("취소했습니다.");
        return Ok(());
    }
    let password = prompt_password("비밀번호: ")?;

    client.delete_account(&password).await.map_err(friendly)?;
    client.store().clear_session();
    println!("✅ 계정이 삭제되었습니다. 그동안 함께해주셔서 감사했습니다.");
    Ok(())
}

/// Fold API errors into the message a person should read.
pub(crate) fn friendly(err: ApiError) -> Box<dyn Error> {
    err.user_message("요청을 처리하지 못했습니다. 잠시 후 다시 시도해주세요.")
        .into()
}
