//! End-to-end decoration run: load both lookups, then stream records through the merger.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::annotation::AnnotationIndex;
use crate::config::DecoratorConfig;
use crate::decorator::{Decorator, LocusTagCounter};
use crate::embl::reader::BlockReader;
use crate::embl::writer::BlockWriter;
use crate::error::Error;
use crate::input::{create_output, open_input};
use crate::interproscan::parse_interproscan_tsv;
use crate::rfam::{
    CoverageSummary, FeatureOptions, RnaFeatureMap, build_rna_feature_map, coverage_summary,
    parse_matches, parse_rfam_lookup,
};

/// Files read and written by one run.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub flatfile: PathBuf,
    pub annotation_file: PathBuf,
    pub rna_deoverlap_file: PathBuf,
    pub rfam_lookup_file: PathBuf,
    pub output: PathBuf,
}

/// Counters collected while decorating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecorationStats {
    pub blocks_read: usize,
    pub blocks_written: usize,
    pub blocks_with_annotations: usize,
    pub annotation_lines: usize,
    pub rna_features: usize,
    pub blocks_stripped: usize,
    pub blocks_skipped: usize,
    pub final_locus_tag: u64,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub annotated_sequences: usize,
    pub rna_contigs: usize,
    pub coverage: CoverageSummary,
    pub stats: DecorationStats,
}

pub fn load_annotations(path: &Path) -> Result<AnnotationIndex, Error> {
    parse_interproscan_tsv(open_input(path)?)
}

/// Builds the RNA feature map and reports how many hits span their whole model.
pub fn load_rna_features(
    deoverlap_path: &Path,
    lookup_path: &Path,
    options: &FeatureOptions,
) -> Result<(RnaFeatureMap, CoverageSummary), Error> {
    let lookup = parse_rfam_lookup(open_input(lookup_path)?)?;
    let matches = parse_matches(open_input(deoverlap_path)?)?;
    let coverage = coverage_summary(&matches, &lookup);
    let features = build_rna_feature_map(&lookup, matches, options)?;
    Ok((features, coverage))
}

/// Streams every record from `reader` through `decorator` into `writer`, in input order.
pub fn decorate<R: BufRead, W: Write>(
    reader: R,
    writer: W,
    decorator: &Decorator<'_>,
    counter: &mut LocusTagCounter,
) -> Result<(DecorationStats, W), Error> {
    let mut stats = DecorationStats::default();
    let mut block_writer = BlockWriter::new(writer);

    for block in BlockReader::new(reader) {
        let block = block?;
        stats.blocks_read += 1;

        let outcome = decorator.merge(block, counter)?;
        if outcome.annotation_lines > 0 {
            stats.blocks_with_annotations += 1;
        }
        stats.annotation_lines += outcome.annotation_lines;
        stats.rna_features += outcome.rna_features;
        stats.blocks_stripped += usize::from(outcome.stripped);
        stats.blocks_skipped += usize::from(outcome.skipped);

        block_writer.write_block(&outcome.block)?;
    }

    stats.blocks_written = block_writer.blocks_written();
    stats.final_locus_tag = counter.value();
    let writer = block_writer.finish()?;
    Ok((stats, writer))
}

/// Runs a full decoration: both lookups are built before the first record is read.
/// The output file only appears once every record has been written.
pub fn run(
    paths: &RunPaths,
    config: &DecoratorConfig,
    scanner_version: &str,
) -> Result<RunReport, Error> {
    let annotations = load_annotations(&paths.annotation_file)?;
    let (rna_features, coverage) = load_rna_features(
        &paths.rna_deoverlap_file,
        &paths.rfam_lookup_file,
        &config.feature_options(),
    )?;

    let settings = config.decoration_settings(scanner_version);
    let decorator = Decorator::new(&annotations, &rna_features, &settings);
    let mut counter = LocusTagCounter::new(config.first_locus_tag);

    let reader = open_input(&paths.flatfile)?;
    let output = create_output(&paths.output)?;
    let (stats, output) = decorate(reader, output, &decorator, &mut counter)?;
    output.finish()?;

    log::info!(
        "Wrote {} records to {}",
        stats.blocks_written,
        paths.output.display()
    );

    Ok(RunReport {
        annotated_sequences: annotations.len(),
        rna_contigs: rna_features.len(),
        coverage,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embl::segment;
    use std::fs;
    use std::io::{Cursor, Read};

    fn record(accession: &str) -> String {
        format!(
            "\
ID   {accession}; SV 1; linear; genomic DNA; STD; ENV; 300 BP.
XX
AC * _{accession}
XX
PR   Project:PRJEB12345;
OS   uncultured bacterium
OC   Bacteria.
XX
FT   CDS             1..300
FT                   /locus_tag=\"UNKNOWN\"
XX
SQ   Sequence 300 BP; 75 A; 75 C; 75 G; 75 T; 0 other;
     acgtacgtac acgtacgtac        20
//
"
        )
    }

    fn tsv_row(seq_id: &str, tail: &str) -> String {
        format!("{seq_id}\tmd5\t312\tPfam\tPF00118\tdesc\t27\t517\t1.2E-150\tT\t07-01-2019\t{tail}\n")
    }

    const DEOVERLAP: &str = "\
#target name
contig_2 - 5S_rRNA RF00001 cm 1 119 100 200 + no 1 0.52 0.0 85.3 1.2e-18 ! -
contig_3 - tRNA RF00005 cm 1 71 10 80 + no 1 0.50 0.0 18.2 0.013 ? -
";

    const LOOKUP: &str = "\
\"accession\",\"name\",\"description\",\"type\",\"length\"
\"RF00001\",\"5S_rRNA\",\"5S ribosomal RNA\",\"Gene; rRNA;\",\"119\"
\"RF00005\",\"tRNA\",\"tRNA\",\"Gene; tRNA;\",\"71\"
";

    fn write_inputs(dir: &Path, records: &str) -> RunPaths {
        let paths = RunPaths {
            flatfile: dir.join("contigs.embl"),
            annotation_file: dir.join("interproscan.tsv"),
            rna_deoverlap_file: dir.join("cmsearch.deoverlapped"),
            rfam_lookup_file: dir.join("rfam.csv"),
            output: dir.join("contigs.new.embl"),
        };
        fs::write(&paths.flatfile, records).unwrap();
        fs::write(
            &paths.annotation_file,
            format!(
                "{}{}",
                tsv_row("contig_1.p1", "IPR002423\tChaperonin\tGO:0005524|GO:0044267"),
                tsv_row("contig_9.p1", "IPR000001"),
            ),
        )
        .unwrap();
        fs::write(&paths.rna_deoverlap_file, DEOVERLAP).unwrap();
        fs::write(&paths.rfam_lookup_file, LOOKUP).unwrap();
        paths
    }

    #[test]
    fn run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let records = format!("{}{}{}", record("contig_1"), record("contig_2"), record("contig_3"));
        let paths = write_inputs(dir.path(), &records);

        let report = run(&paths, &DecoratorConfig::default(), "5.52-86.0").unwrap();
        let stats = report.stats;
        assert_eq!(stats.blocks_read, 3);
        assert_eq!(stats.blocks_written, 3);
        assert_eq!(stats.blocks_with_annotations, 1);
        assert_eq!(stats.annotation_lines, 4);
        assert_eq!(stats.rna_features, 1);
        assert_eq!(stats.blocks_stripped, 2);
        assert_eq!(stats.final_locus_tag, 3);
        assert_eq!(report.annotated_sequences, 2);
        assert_eq!(report.rna_contigs, 1);
        assert_eq!(report.coverage, CoverageSummary { complete: 1, partial: 0 });

        let output = fs::read_to_string(&paths.output).unwrap();
        let blocks = segment(Cursor::new(output.as_bytes())).unwrap();
        let accessions: Vec<_> = blocks.iter().map(|b| b.accession.as_deref().unwrap()).collect();
        assert_eq!(accessions, ["contig_1", "contig_2", "contig_3"]);

        assert!(blocks[0].text().contains("/locus_tag=\"transl_table_LOCUS1\""));
        assert!(blocks[0].text().contains("protein motif:GO:0044267"));
        assert!(!blocks[0].text().contains("OS   "));
        assert!(blocks[1].text().contains("FT   rRNA            100..200"));
        assert!(blocks[1].text().contains("/locus_tag=\"transl_table_LOCUS2\""));
        assert!(blocks[2].text().contains("/locus_tag=\"transl_table_LOCUS3\""));
        assert!(blocks[2].text().contains("OS   uncultured bacterium"));
    }

    #[test]
    fn gzip_input_and_output() {
        use flate2::Compression;
        use flate2::write::GzEncoder;

        let dir = tempfile::tempdir().unwrap();
        let mut paths = write_inputs(dir.path(), "");
        paths.flatfile = dir.path().join("contigs.embl.gz");
        paths.output = dir.path().join("contigs.new.embl.gz");

        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(record("contig_1").as_bytes()).unwrap();
        fs::write(&paths.flatfile, encoder.finish().unwrap()).unwrap();

        let report = run(&paths, &DecoratorConfig::default(), "5.52-86.0").unwrap();
        assert_eq!(report.stats.blocks_written, 1);

        let mut content = String::new();
        open_input(&paths.output)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert!(content.contains("ab initio prediction:InterProScan:5.52-86.0"));
    }

    #[test]
    fn unknown_rfam_model_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_inputs(dir.path(), &record("contig_1"));
        fs::write(
            &paths.rna_deoverlap_file,
            "contig_1 - x RF99999 cm 1 10 1 10 + no 1 0.5 0.0 20.0 1e-5 ! -\n",
        )
        .unwrap();
        let err = run(&paths, &DecoratorConfig::default(), "1.0").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(!paths.output.exists());
    }

    #[test]
    fn unterminated_record_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let records = format!("{}ID   contig_2;\nAC * _contig_2\n", record("contig_1"));
        let paths = write_inputs(dir.path(), &records);
        let err = run(&paths, &DecoratorConfig::default(), "1.0").unwrap_err();
        assert!(err.to_string().contains("unterminated record"));
        assert!(!paths.output.exists());
    }

    #[test]
    fn structural_abort_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let broken = record("contig_2").replace("SQ   Sequence", "CO   Sequence");
        let records = format!("{}{broken}", record("contig_1"));
        let paths = write_inputs(dir.path(), &records);

        let err = run(&paths, &DecoratorConfig::default(), "1.0").unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
        assert!(!paths.output.exists());
        let leftover = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftover, 4);
    }
}
