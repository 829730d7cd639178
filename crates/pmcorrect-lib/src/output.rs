//! Cluster output
//!
//! One line per cluster:
//! `REPRESENTATIVE<TAB>TOTAL_COUNT<TAB>{member1: count1, member2: count2}`

use crate::cluster::{Cluster, ClusterMap};
use crate::error::Result;
use std::io::Write;

/// Format one cluster as an output line (without newline)
pub fn format_cluster(cluster: &Cluster) -> String {
    let members = cluster
        .members_by_count()
        .iter()
        .map(|m| format!("{}: {}", m.key, m.count))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}\t{}\t{{{}}}", cluster.representative(), cluster.total(), members)
}

/// Write all clusters, optionally sorted by representative key
pub fn write_clusters<W: Write>(mut writer: W, clusters: &ClusterMap, sort_output: bool) -> Result<()> {
    let mut ordered: Vec<&Cluster> = clusters.iter().collect();
    if sort_output {
        ordered.sort_by(|a, b| a.representative().cmp(b.representative()));
    }
    for cluster in ordered {
        writeln!(writer, "{}", format_cluster(cluster))?;
    }
    writer.flush()?;
    Ok(())
}
