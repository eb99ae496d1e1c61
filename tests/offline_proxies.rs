// tests/offline_proxies.rs

mod common;
use crate::common::{TestResult, init_tracing};

use flowdag::proxy::offline::{KeywordChat, StaticSearch};
use flowdag::proxy::{ChatConfig, ChatMessage, ChatProxy, SearchHit, SearchProxy, SearchQuery};

fn corpus() -> Vec<SearchHit> {
    vec![
        SearchHit {
            title: "Pointer latency after sleep".to_string(),
            url: "https://example.test/latency".to_string(),
            snippet: "Survey of wake-from-sleep input lag".to_string(),
        },
        SearchHit {
            title: "Reducing input latency".to_string(),
            url: "https://example.test/input".to_string(),
            snippet: "Techniques for lower pointer latency".to_string(),
        },
    ]
}

#[tokio::test]
async fn keyword_chat_classifies_by_word_overlap() -> TestResult {
    init_tracing();
    let chat = KeywordChat::new();

    let reply = chat
        .chat(
            vec![
                ChatMessage::system(
                    "Classify the text into one of the categories: [Bug reports, Ideas]",
                ),
                ChatMessage::user("Bug: crash when uploading large files"),
            ],
            ChatConfig::default(),
        )
        .await?;
    assert_eq!(reply, "Bug reports");

    Ok(())
}

#[tokio::test]
async fn keyword_chat_selects_indices_matching_the_concept() -> TestResult {
    init_tracing();
    let chat = KeywordChat::new();

    let reply = chat
        .chat(
            vec![
                ChatMessage::system("Respond with a json array of matched indices."),
                ChatMessage::user(
                    "Concept: Food\nRelation: can be consumed by\nOptions:\n1. Food stand\n2. Car\n3. Cat food bowl",
                ),
            ],
            ChatConfig::default(),
        )
        .await?;
    assert_eq!(reply, "[1,3]");

    Ok(())
}

#[tokio::test]
async fn keyword_chat_answers_yes_no_by_overlap() -> TestResult {
    init_tracing();
    let chat = KeywordChat::new();
    let system = "Answer the question about the text strictly with Yes or No.\nQuestion: Is this about latency?";

    let yes = chat
        .chat(
            vec![
                ChatMessage::system(system),
                ChatMessage::user("pointer latency fix"),
            ],
            ChatConfig::default(),
        )
        .await?;
    assert_eq!(yes, "Yes");

    let no = chat
        .chat(
            vec![ChatMessage::system(system), ChatMessage::user("bananas")],
            ChatConfig::default(),
        )
        .await?;
    assert_eq!(no, "No");

    Ok(())
}

#[tokio::test]
async fn static_search_filters_and_pages() -> TestResult {
    init_tracing();
    let search = StaticSearch::new(corpus());

    let page = search
        .search(SearchQuery {
            query: "pointer latency".to_string(),
            top: 1,
            skip: 1,
        })
        .await?;
    assert_eq!(page.total_count, 2);
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].title, "Reducing input latency");

    let none = search
        .search(SearchQuery {
            query: "gardening".to_string(),
            top: 5,
            skip: 0,
        })
        .await?;
    assert_eq!(none.total_count, 0);
    assert!(none.results.is_empty());

    Ok(())
}
