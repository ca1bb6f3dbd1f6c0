//! `pgvector` helpers. sea-orm has no native vector column type, so every
//! read or write of an `embedding`/`centroid_embedding` column goes through
//! `Statement::from_sql_and_values` with an explicit `::vector` cast,
//! grounded on the same technique used in the paperforge-style repository.

pub fn to_pgvector_literal(embedding: &[f32]) -> String {
    let mut s = String::with_capacity(embedding.len() * 8 + 2);
    s.push('[');
    for (i, v) in embedding.iter().enumerate() {
        if i > 0 {
            s.push(',');
        }
        s.push_str(&v.to_string());
    }
    s.push(']');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_bracketed_csv() {
        assert_eq!(to_pgvector_literal(&[1.0, 2.5, -3.0]), "[1,2.5,-3]");
        assert_eq!(to_pgvector_literal(&[]), "[]");
    }
}
