//! SQL script rendering for the feature catalog

use std::io::{self, Write};

use crate::entities::FeatureDefinition;

const RULE: &str =
    "-- ============================================================================";

const COLUMNS: &str = "feature_id, feature_code, feature_name, feature_category, process_stage, measurement_type, unit, normal_range_min, normal_range_max, description, is_critical";

/// Quote a string literal for SQL
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn row(def: &FeatureDefinition) -> String {
    format!(
        "({}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {})",
        def.feature_id,
        quote(&def.code),
        quote(&def.name),
        quote(def.category.as_str()),
        quote(&def.stage),
        quote(&def.measurement_type),
        quote(&def.unit),
        def.range_min,
        def.range_max,
        quote(&def.description),
        if def.is_critical { "TRUE" } else { "FALSE" }
    )
}

/// Write the catalog as an SQL script: one multi-row INSERT per batch,
/// followed by a verification query.
pub fn render_sql<W: Write>(
    out: &mut W,
    defs: &[FeatureDefinition],
    schema: &str,
    batch_size: usize,
) -> io::Result<()> {
    let batch_size = batch_size.max(1);

    writeln!(out, "{}", RULE)?;
    writeln!(out, "-- Feature Metadata - {} SECOM Features", defs.len())?;
    writeln!(out, "-- Auto-generated descriptive feature definitions")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)?;
    writeln!(out, "USE {};", schema)?;
    writeln!(out)?;

    for (batch_no, batch) in defs.chunks(batch_size).enumerate() {
        let first = batch_no * batch_size;
        let last = first + batch.len() - 1;
        let rows: Vec<String> = batch.iter().map(row).collect();

        writeln!(out, "-- Features {} to {}", first, last)?;
        writeln!(out, "INSERT INTO feature_meta ({}) VALUES", COLUMNS)?;
        writeln!(out, "{}", rows.join(",\n"))?;
        writeln!(out, ";")?;
        writeln!(out)?;
    }

    writeln!(out, "{}", RULE)?;
    writeln!(out, "-- Feature metadata generation complete")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)?;
    writeln!(out, "SELECT 'Feature metadata loaded successfully' as status,")?;
    writeln!(out, "       COUNT(*) as total_features,")?;
    writeln!(out, "       COUNT(DISTINCT feature_category) as categories,")?;
    writeln!(
        out,
        "       SUM(CASE WHEN is_critical THEN 1 ELSE 0 END) as critical_features"
    )?;
    writeln!(out, "FROM feature_meta;")?;

    Ok(())
}

/// Render the script into a string
pub fn sql_script(defs: &[FeatureDefinition], schema: &str, batch_size: usize) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = render_sql(&mut buf, defs, schema, batch_size);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::definitions;

    #[test]
    fn test_first_row_literal() {
        let defs = definitions();
        assert_eq!(
            row(&defs[0]),
            "(1, 'F0', 'CVD_Process_temperature_1', 'CVD_Process', 'Deposition', 'temperature', '°C', 200, 800, 'Deposition temperature measurement from Zone_A', TRUE)"
        );
        assert_eq!(
            row(&defs[1]),
            "(2, 'F1', 'CVD_Process_chamber_pressure_2', 'CVD_Process', 'Deposition', 'chamber_pressure', 'mTorr', 0.1, 100, 'Deposition chamber_pressure measurement from Zone_A', FALSE)"
        );
    }

    #[test]
    fn test_batches_of_fifty() {
        let script = sql_script(&definitions(), "secom", 50);
        assert_eq!(script.matches("INSERT INTO feature_meta").count(), 12);
        assert!(script.contains("-- Features 0 to 49\n"));
        assert!(script.contains("-- Features 550 to 589\n"));
        assert!(script.starts_with(RULE));
        assert!(script.contains("USE secom;"));
        assert!(script.trim_end().ends_with("FROM feature_meta;"));
    }

    #[test]
    fn test_batch_size_does_not_change_rows() {
        let defs = definitions();
        let rows_of = |script: &str| -> Vec<String> {
            script
                .lines()
                .filter(|l| l.starts_with('('))
                .map(|l| l.trim_end_matches(',').to_string())
                .collect()
        };
        let a = rows_of(&sql_script(&defs, "secom", 50));
        let b = rows_of(&sql_script(&defs, "secom", 7));
        assert_eq!(a.len(), 590);
        assert_eq!(a, b);
    }

    #[test]
    fn test_render_is_byte_identical() {
        let defs = definitions();
        assert_eq!(sql_script(&defs, "secom", 50), sql_script(&defs, "secom", 50));
    }

    #[test]
    fn test_quotes_are_escaped() {
        assert_eq!(quote("operator's"), "'operator''s'");
    }
}
