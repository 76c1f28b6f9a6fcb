//! Routing performance benchmarks
//!
//! Measures the non-I/O parts of a chat turn: priority list computation,
//! history shaping and per-provider request building.
//!
//! Run with: `cargo bench`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lumi::{
    config::{DEFAULT_SYSTEM_PROMPT, ProviderEndpoint},
    history::{ConversationHistory, ConversationMessage},
    providers::{
        ChatProvider, ProviderId, gemini::GeminiProvider, openai_compat::ChatCompletionProvider,
    },
    router::priority_list,
};
use std::hint::black_box;

fn conversation(turns: usize) -> ConversationHistory {
    let mut messages = vec![ConversationMessage::assistant("Hello! I'm Lumi.")];
    for i in 0..turns {
        messages.push(ConversationMessage::user(format!(
            "Question {} about photosynthesis?",
            i
        )));
        messages.push(ConversationMessage::assistant(format!(
            "Answer {}: plants turn light into chemical energy.",
            i
        )));
    }
    messages.push(ConversationMessage::user("Can you make me a study plan?"));
    ConversationHistory::new(messages)
}

/// Benchmark priority list computation for every preference
fn bench_priority_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("priority_list");
    for id in ProviderId::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(id), &id, |b, id| {
            b.iter(|| priority_list(black_box(*id)));
        });
    }
    group.finish();
}

/// Benchmark turn-based history shaping at several conversation lengths
fn bench_turn_based_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("turn_based_view");
    for turns in [1, 10, 100] {
        let history = conversation(turns);
        group.bench_with_input(BenchmarkId::from_parameter(turns), &history, |b, h| {
            b.iter(|| black_box(h).turn_based_view());
        });
    }
    group.finish();
}

/// Benchmark request building for both provider classes
fn bench_build_request(c: &mut Criterion) {
    let client = reqwest::Client::new();
    let gemini = GeminiProvider::new(
        client.clone(),
        ProviderEndpoint::defaults(ProviderId::Gemini),
    );
    let groq = ChatCompletionProvider::new(client, ProviderEndpoint::defaults(ProviderId::Groq));
    let history = conversation(20);

    let mut group = c.benchmark_group("build_request");
    group.bench_function("gemini", |b| {
        b.iter(|| gemini.build_request(black_box(&history), DEFAULT_SYSTEM_PROMPT))
    });
    group.bench_function("chat_completion", |b| {
        b.iter(|| groq.build_request(black_box(&history), DEFAULT_SYSTEM_PROMPT))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_priority_list,
    bench_turn_based_view,
    bench_build_request
);
criterion_main!(benches);
