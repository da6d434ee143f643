//! End-to-end pipeline tests using in-process capability fakes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use paper_qa::{
    relevance_score, EmbeddingProvider, Generation, GenerationRequest, Generator,
    InMemoryVectorIndex, IndexedRecord, QaConfig, QaError, QaPipeline, RetrievedChunk,
    TokenUsage, VectorIndex, NO_INFORMATION_ANSWER,
};

const DIM: usize = 16;

/// Deterministic embedder: folds bytes into a fixed-dimension vector, so
/// identical texts always embed identically. Counts every call.
struct StubEmbedder {
    calls: Arc<AtomicUsize>,
}

impl StubEmbedder {
    fn new() -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Arc::new(Self { calls: Arc::clone(&calls) }), calls)
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> paper_qa::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut vector = vec![0.0f32; DIM];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % DIM] += f32::from(byte) / 255.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Generator fake returning a fixed answer and counting invocations.
struct StubGenerator {
    calls: Arc<AtomicUsize>,
}

impl StubGenerator {
    fn new() -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Arc::new(Self { calls: Arc::clone(&calls) }), calls)
    }
}

#[async_trait]
impl Generator for StubGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> paper_qa::Result<Generation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Generation {
            text: "Attention lets the model relate positions across the sequence.".to_string(),
            usage: TokenUsage { input_tokens: 120, output_tokens: 40 },
        })
    }
}

/// A vector index that claims to hold records but never returns any hits,
/// exercising the zero-relevant-results path on a populated index.
struct NoHitsIndex;

#[async_trait]
impl VectorIndex for NoHitsIndex {
    async fn upsert(&self, _records: &[IndexedRecord]) -> paper_qa::Result<()> {
        Ok(())
    }

    async fn query(&self, _embedding: &[f32], _top_k: usize) -> paper_qa::Result<Vec<RetrievedChunk>> {
        Ok(Vec::new())
    }

    async fn count(&self) -> paper_qa::Result<usize> {
        Ok(1)
    }

    async fn reset(&self) -> paper_qa::Result<()> {
        Ok(())
    }
}

struct Fixture {
    pipeline: QaPipeline,
    embed_calls: Arc<AtomicUsize>,
    generate_calls: Arc<AtomicUsize>,
}

fn fixture_with_index(index: Arc<dyn VectorIndex>) -> Fixture {
    let (embedder, embed_calls) = StubEmbedder::new();
    let (generator, generate_calls) = StubGenerator::new();
    let pipeline = QaPipeline::builder()
        .config(QaConfig::default())
        .embedding_provider(embedder)
        .vector_index(index)
        .generator(generator)
        .build()
        .expect("pipeline construction");
    Fixture { pipeline, embed_calls, generate_calls }
}

fn fixture() -> Fixture {
    fixture_with_index(Arc::new(InMemoryVectorIndex::new()))
}

fn synthetic_document(min_chars: usize) -> String {
    let sentence =
        "The transformer architecture relies on attention mechanisms to capture long range dependencies.";
    let mut text = String::new();
    while text.chars().count() < min_chars {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(sentence);
    }
    text
}

#[tokio::test]
async fn indexing_a_3000_char_document_yields_three_to_five_chunks() {
    let f = fixture();
    let summary = f.pipeline.index(&synthetic_document(3000)).await.unwrap();

    assert!(
        (3..=5).contains(&summary.chunks_created),
        "expected 3-5 chunks, got {}",
        summary.chunks_created
    );
    assert_eq!(summary.documents_indexed, summary.chunks_created);
    assert!(f.pipeline.is_ready().await.unwrap());
    assert_eq!(f.pipeline.document_count().await.unwrap(), summary.chunks_created);
}

#[tokio::test]
async fn near_duplicate_question_scores_high() {
    let f = fixture();
    let topic = "The transformer relies entirely on self-attention to compute representations.";
    let summary = f.pipeline.index(topic).await.unwrap();
    assert_eq!(summary.chunks_created, 1);

    let answer = f.pipeline.answer(topic, None).await.unwrap();
    assert_eq!(answer.context_chunks_used, 1);
    assert!(
        answer.context[0].relevance_score >= 0.5,
        "score {} below 0.5",
        answer.context[0].relevance_score
    );
    assert_eq!(f.generate_calls.load(Ordering::SeqCst), 1);
    assert_eq!(answer.usage.input_tokens, 120);
    assert_eq!(answer.usage.output_tokens, 40);
}

#[tokio::test]
async fn asking_before_indexing_signals_empty_index_without_capability_calls() {
    let f = fixture();
    let err = f.pipeline.answer("What is multi-head attention?", None).await.unwrap_err();

    assert!(matches!(err, QaError::EmptyIndex));
    assert_eq!(f.embed_calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.generate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn zero_hits_on_populated_index_short_circuits_generation() {
    let f = fixture_with_index(Arc::new(NoHitsIndex));
    let answer = f.pipeline.answer("What is multi-head attention?", None).await.unwrap();

    assert_eq!(answer.answer, NO_INFORMATION_ANSWER);
    assert_eq!(answer.context_chunks_used, 0);
    assert!(answer.context.is_empty());
    assert_eq!(answer.usage, TokenUsage::default());
    assert_eq!(f.generate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn context_snippets_preserve_retrieval_order_with_monotone_scores() {
    let f = fixture();
    let document = "Encoders stack six identical layers. Decoders add masked attention over outputs. \
        Positional encodings inject order information. Scaled dot product attention divides by the key dimension.";
    f.pipeline.index(document).await.unwrap();

    let answer =
        f.pipeline.answer("How does scaled dot product attention work?", Some(4)).await.unwrap();

    assert!(answer.context_chunks_used >= 1);
    for pair in answer.context.windows(2) {
        assert!(pair[0].relevance_score >= pair[1].relevance_score);
    }
    for snippet in &answer.context {
        assert!((0.0..=1.0).contains(&snippet.relevance_score));
    }
}

#[tokio::test]
async fn malformed_questions_are_rejected_before_any_capability_call() {
    let f = fixture();
    f.pipeline.index("A small document about attention mechanisms.").await.unwrap();
    let embed_calls_after_index = f.embed_calls.load(Ordering::SeqCst);

    let too_short = f.pipeline.answer("Hi?", None).await.unwrap_err();
    assert!(matches!(too_short, QaError::Validation(_)));

    let long_question = "why ".repeat(200);
    let too_long = f.pipeline.answer(&long_question, None).await.unwrap_err();
    assert!(matches!(too_long, QaError::Validation(_)));

    let zero_k = f.pipeline.answer("What is attention?", Some(0)).await.unwrap_err();
    assert!(matches!(zero_k, QaError::Validation(_)));

    let huge_k = f.pipeline.answer("What is attention?", Some(11)).await.unwrap_err();
    assert!(matches!(huge_k, QaError::Validation(_)));

    assert_eq!(f.embed_calls.load(Ordering::SeqCst), embed_calls_after_index);
    assert_eq!(f.generate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn indexing_empty_text_is_a_source_error() {
    let f = fixture();
    let err = f.pipeline.index("   \n\t  ").await.unwrap_err();
    assert!(matches!(err, QaError::Source(_)));

    // A document that cleans down to nothing behaves the same.
    let err = f.pipeline.index("42\n7\n").await.unwrap_err();
    assert!(matches!(err, QaError::Source(_)));
}

#[tokio::test]
async fn reindexing_replaces_previous_records() {
    let f = fixture();
    f.pipeline.index(&synthetic_document(3000)).await.unwrap();
    let first_count = f.pipeline.document_count().await.unwrap();
    assert!(first_count >= 3);

    let summary = f.pipeline.index("A single short replacement document.").await.unwrap();
    assert_eq!(summary.chunks_created, 1);
    assert_eq!(f.pipeline.document_count().await.unwrap(), 1);
}

#[tokio::test]
async fn reset_is_idempotent_and_bumps_the_generation() {
    let index = InMemoryVectorIndex::new();
    assert_eq!(index.generation().await, 0);

    index.reset().await.unwrap();
    assert_eq!(index.count().await.unwrap(), 0);
    assert_eq!(index.generation().await, 1);

    // Resetting an already-empty collection is not an error.
    index.reset().await.unwrap();
    assert_eq!(index.count().await.unwrap(), 0);
    assert_eq!(index.generation().await, 2);
}

#[tokio::test]
async fn query_results_come_back_in_ascending_distance_order() {
    let index = InMemoryVectorIndex::new();
    let records: Vec<IndexedRecord> = [
        ("chunk_0", vec![1.0, 0.0, 0.0]),
        ("chunk_1", vec![0.0, 1.0, 0.0]),
        ("chunk_2", vec![0.7, 0.7, 0.0]),
        ("chunk_3", vec![-1.0, 0.0, 0.0]),
    ]
    .into_iter()
    .map(|(id, embedding)| IndexedRecord {
        id: id.to_string(),
        text: format!("text for {id}"),
        embedding,
        metadata: HashMap::new(),
    })
    .collect();
    index.upsert(&records).await.unwrap();

    let results = index.query(&[1.0, 0.0, 0.0], 10).await.unwrap();
    assert_eq!(results.len(), 4);
    for pair in results.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
        assert!(relevance_score(pair[0].distance) >= relevance_score(pair[1].distance));
    }
    assert_eq!(results[0].text, "text for chunk_0");

    // top_k caps the result count; asking for more than stored is fine.
    let results = index.query(&[1.0, 0.0, 0.0], 2).await.unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn concurrent_answers_against_one_index_are_safe() {
    let f = fixture();
    f.pipeline.index(&synthetic_document(3000)).await.unwrap();

    let (a, b, c) = tokio::join!(
        f.pipeline.answer("What does the encoder stack contain?", None),
        f.pipeline.answer("How are dependencies captured?", Some(2)),
        f.pipeline.answer("What is the attention mechanism?", Some(3)),
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(f.generate_calls.load(Ordering::SeqCst), 3);
}

#[test]
fn builder_requires_all_capabilities() {
    let err = QaPipeline::builder().config(QaConfig::default()).build().unwrap_err();
    assert!(matches!(err, QaError::Config(_)));
}
