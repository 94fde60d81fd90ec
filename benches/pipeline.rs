use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use mmrag::{
    EmbeddingProvider, InMemoryStore, NewDocument, Orchestrator, PipelineConfig, QueryRequest,
    StubProvider, prompt,
};
use tokio::runtime::Runtime;

const DIMENSION: usize = 768;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .expect("tokio runtime")
}

fn seeded(rt: &Runtime, documents: usize) -> Orchestrator {
    let stub = StubProvider::new(DIMENSION).with_answer("bench answer");
    let store = Arc::new(InMemoryStore::new(DIMENSION));
    rt.block_on(async {
        let mut batch = Vec::with_capacity(documents);
        for i in 0..documents {
            let content = format!("Bench document {i} about subject {}", i % 17);
            let embedding = stub.embed(&content, None).await.expect("stub embed");
            let content_type = if i % 3 == 0 { "image" } else { "text" };
            batch.push(NewDocument::new(content, content_type, embedding));
        }
        store.insert_batch(batch).expect("seed store");
    });
    Orchestrator::new(Arc::new(stub), store, PipelineConfig::default())
}

fn query_bench(c: &mut Criterion) {
    let rt = runtime();
    for documents in [100, 1_000, 10_000] {
        let rag = seeded(&rt, documents);
        let request = QueryRequest::new("subject 7");
        c.bench_function(&format!("query_{documents}_docs"), |b| {
            b.iter(|| {
                let response = rt
                    .block_on(rag.query(black_box(&request)))
                    .expect("bench query");
                black_box(response);
            });
        });
    }
}

fn filtered_search_bench(c: &mut Criterion) {
    let rt = runtime();
    let rag = seeded(&rt, 10_000);
    c.bench_function("search_10000_docs_image_filter", |b| {
        b.iter(|| {
            let hits = rt
                .block_on(rag.search(black_box("subject 3"), Some(10), Some("image")))
                .expect("bench search");
            black_box(hits);
        });
    });
}

fn prompt_bench(c: &mut Criterion) {
    let rt = runtime();
    let rag = seeded(&rt, 1_000);
    let sources = rt
        .block_on(rag.search("subject 1", Some(20), None))
        .expect("bench search");
    c.bench_function("build_context_and_prompt_20_sources", |b| {
        b.iter(|| {
            let context = prompt::build_context(black_box(&sources));
            black_box(prompt::build_prompt(&context, "subject 1"));
        });
    });
}

criterion_group!(benches, query_bench, filtered_search_bench, prompt_bench);
criterion_main!(benches);
