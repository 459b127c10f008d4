//! Property tests for vector store search ordering.

use ragdoc::document::{Chunk, ChunkMetadata, FileType};
use ragdoc::inmemory::InMemoryVectorStore;
use ragdoc::vectorstore::VectorStore;
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate a chunk with a normalized embedding.
fn arb_chunk(dim: usize) -> impl Strategy<Value = Chunk> {
    ("[a-z]{3,8}", "[a-z ]{5,30}", arb_normalized_embedding(dim)).prop_map(
        |(id, text, embedding)| Chunk {
            id,
            text,
            embedding,
            metadata: ChunkMetadata {
                source_file: "doc.pdf".to_string(),
                page: 0,
                file_type: FileType::Pdf,
            },
        },
    )
}

/// For any set of stored chunks, search returns results ordered by
/// ascending cosine distance (nearest first), bounded by `k`, and the
/// derived similarity is monotonically decreasing along the list.
mod prop_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_nearest_first_and_bounded_by_k(
            chunks in proptest::collection::vec(arb_chunk(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (results, stored) = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                store.create_collection("test", DIM).await.unwrap();
                store.add("test", &chunks).await.unwrap();
                let results = store.search("test", &query, k).await.unwrap();
                (results, chunks.len())
            });

            prop_assert!(results.len() <= k);
            prop_assert!(results.len() <= stored);

            for window in results.windows(2) {
                prop_assert!(
                    window[0].distance <= window[1].distance,
                    "results not nearest-first: {} > {}",
                    window[0].distance,
                    window[1].distance,
                );
                prop_assert!(window[0].similarity() >= window[1].similarity());
            }
        }
    }
}
