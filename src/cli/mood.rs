//! Mood diary commands.

use std::error::Error;

use chrono::{Local, NaiveDate};

use crate::api::{ApiClient, EmotionRecordRequest};
use crate::cli::account::friendly;
use crate::core::message::sort_records_by_date;
use crate::utils::validation::validate_score;

pub async fn record(
    client: &ApiClient,
    score: u8,
    date: Option<NaiveDate>,
    comment: Option<&str>,
    keywords: &[String],
) -> Result<(), Box<dyn Error>> {
    if let Err(err) = validate_score(score) {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
    let date = date.unwrap_or_else(|| Local::now().date_naive());

    client
        .record_emotion(&EmotionRecordRequest {
            score,
            date,
            comment,
            keywords,
        })
        .await
        .map_err(friendly)?;
    println!("✅ {date}의 감정 점수 {score}점을 기록했습니다.");
    Ok(())
}

pub async fn list(
    client: &ApiClient,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), Box<dyn Error>> {
    let mut records = client
        .emotion_records(start, end)
        .await
        .map_err(friendly)?
        .records;
    if records.is_empty() {
        println!("해당 기간에 감정 기록이 없습니다.");
        return Ok(());
    }
    sort_records_by_date(&mut records);

    for record in &records {
        let bar = "█".repeat(record.score as usize);
        print!("{}  {:>2}점 {}", record.date, record.score, bar);
        if !record.keywords.is_empty() {
            print!("  [{}]", record.keywords.join(", "));
        }
        println!();
        if let Some(comment) = &record.comment {
            println!("            {comment}");
        }
    }
    Ok(())
}

pub async fn summary(client: &ApiClient) -> Result<(), Box<dyn Error>> {
    let summary = client.emotion_summary().await.map_err(friendly)?.summary;
    println!("기록 수:     {}개", summary.record_count);
    println!("평균 점수:   {:.1}점", summary.average_score);
    if !summary.top_keywords.is_empty() {
        println!("자주 쓴 단어: {}", summary.top_keywords.join(", "));
    }
    Ok(())
}
