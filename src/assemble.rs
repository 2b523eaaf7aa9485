//! Turns parsed page specifications into ordered page sequences, one per
//! output document.

use crate::error::Result;
use crate::page_range::{self, PageSpec, ParseMode};
use crate::pdf::{PageRef, Rotation, SourceDocument};
use log::warn;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Output name used by the combine tool.
pub const MERGED_NAME: &str = "merged_pages.pdf";

/// Base name used by the split tool when the caller does not pick one.
pub const DEFAULT_SPLIT_BASE: &str = "split_pdf";

/// Characters that are not allowed in an output file name.
const UNSAFE_NAME_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// A named, fully resolved sequence of pages for one output document.
#[derive(Debug, Clone)]
pub struct AssembledOutput<'a> {
    pub name: String,
    pub pages: Vec<PageRef<'a>>,
}

/// A non-fatal problem found while assembling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A non-blank specification selected no pages.
    EmptySelection { source: String, spec: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::EmptySelection { source, spec } => write!(
                f,
                "No valid pages in '{}' for {}, skipping",
                spec, source
            ),
        }
    }
}

#[derive(Debug, Default)]
pub struct Assembly<'a> {
    pub outputs: Vec<AssembledOutput<'a>>,
    pub warnings: Vec<Warning>,
}

impl Assembly<'_> {
    fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// One input of the combine tool: a source and the pages to take from it.
#[derive(Debug, Clone, Copy)]
pub struct MergeSelection<'a> {
    pub source: &'a SourceDocument,
    /// Blank means every page.
    pub spec: &'a str,
}

/// Concatenate the selected pages of every source, in source order, into a
/// single output named `name`.
///
/// Each source contributes its own pages in ascending order; pages are never
/// re-sorted across sources. Yields no output when nothing was selected.
pub fn assemble_merge<'a>(
    selections: &[MergeSelection<'a>],
    name: &str,
    mode: ParseMode,
) -> Result<Assembly<'a>> {
    let mut assembly = Assembly::default();
    let mut pages = Vec::new();

    for selection in selections {
        let source = selection.source;
        let spec = if selection.spec.trim().is_empty() {
            PageSpec::all(source.page_count())
        } else {
            page_range::parse_with_mode(selection.spec, source.page_count(), mode)?
        };

        if spec.is_empty() && !selection.spec.trim().is_empty() {
            assembly.warn(Warning::EmptySelection {
                source: source.name().to_string(),
                spec: selection.spec.to_string(),
            });
            continue;
        }
        pages.extend(source.select(&spec));
    }

    if !pages.is_empty() {
        assembly.outputs.push(AssembledOutput {
            name: name.to_string(),
            pages,
        });
    }
    Ok(assembly)
}

/// Split one source into several outputs.
///
/// A blank `spec` yields one single-page output per page, named
/// `{base}_page_{n}.pdf`. Otherwise every `;`-separated group that selects at
/// least one page yields an output named `{base}_pages_{group}.pdf`. The base
/// name is sanitized like the group labels, so names never carry a path.
pub fn assemble_split<'a>(
    source: &'a SourceDocument,
    spec: &str,
    base_name: &str,
    mode: ParseMode,
) -> Result<Assembly<'a>> {
    let mut assembly = Assembly::default();
    let base_name = sanitize_name(base_name);

    if spec.trim().is_empty() {
        assembly.outputs = source
            .pages()
            .map(|page| AssembledOutput {
                name: format!("{}_page_{}.pdf", base_name, page.index() + 1),
                pages: vec![page],
            })
            .collect();
        return Ok(assembly);
    }

    for group in page_range::group_definitions(spec, source.page_count(), mode)? {
        if group.pages.is_empty() {
            assembly.warn(Warning::EmptySelection {
                source: source.name().to_string(),
                spec: group.label,
            });
            continue;
        }
        assembly.outputs.push(AssembledOutput {
            name: format!("{}_pages_{}.pdf", base_name, sanitize_name(&group.label)),
            pages: source.select(&group.pages),
        });
    }

    make_names_unique(&mut assembly.outputs);
    Ok(assembly)
}

/// Every page of `source`, turned by `rotation`, as a single output.
pub fn assemble_rotated<'a>(
    source: &'a SourceDocument,
    rotation: Rotation,
    name: &str,
) -> Assembly<'a> {
    let pages: Vec<_> = source.pages().map(|page| page.rotated(rotation)).collect();
    let outputs = if pages.is_empty() {
        Vec::new()
    } else {
        vec![AssembledOutput {
            name: name.to_string(),
            pages,
        }]
    };
    Assembly {
        outputs,
        warnings: Vec::new(),
    }
}

/// Replace characters that are unsafe in file names with `_`.
pub fn sanitize_name(label: &str) -> String {
    label.replace(|c: char| UNSAFE_NAME_CHARS.contains(&c), "_")
}

/// Suffix repeated names with `_2`, `_3`, ... so archive entries never clash.
fn make_names_unique(outputs: &mut [AssembledOutput<'_>]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for output in outputs.iter_mut() {
        let count = seen.entry(output.name.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            output.name = match output.name.rsplit_once('.') {
                Some((stem, ext)) => format!("{}_{}.{}", stem, count, ext),
                None => format!("{}_{}", output.name, count),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageError;
    use crate::pdf::fixtures::test_pdf;
    use proptest::prelude::*;

    fn source(pages: u32, label: &str) -> SourceDocument {
        SourceDocument::from_bytes(format!("{}.pdf", label), &test_pdf(pages, label)).unwrap()
    }

    fn pages_of(output: &AssembledOutput<'_>) -> Vec<(String, u32)> {
        output
            .pages
            .iter()
            .map(|p| (p.source().name().to_string(), p.index()))
            .collect()
    }

    #[test]
    fn test_merge_concatenates_in_source_order() {
        let a = source(5, "A");
        let b = source(3, "B");
        let selections = [
            MergeSelection { source: &b, spec: "3, 1" },
            MergeSelection { source: &a, spec: "4-2" },
        ];
        let assembly = assemble_merge(&selections, MERGED_NAME, ParseMode::Lenient).unwrap();

        assert_eq!(assembly.outputs.len(), 1);
        assert_eq!(assembly.outputs[0].name, "merged_pages.pdf");
        assert_eq!(
            pages_of(&assembly.outputs[0]),
            vec![
                ("B.pdf".to_string(), 0),
                ("B.pdf".to_string(), 2),
                ("A.pdf".to_string(), 1),
                ("A.pdf".to_string(), 2),
                ("A.pdf".to_string(), 3),
            ]
        );
        assert!(assembly.warnings.is_empty());
    }

    #[test]
    fn test_merge_blank_spec_takes_all_pages() {
        let a = source(3, "A");
        let selections = [MergeSelection { source: &a, spec: "   " }];
        let assembly = assemble_merge(&selections, MERGED_NAME, ParseMode::Lenient).unwrap();
        let indices: Vec<u32> = assembly.outputs[0].pages.iter().map(PageRef::index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_merge_empty_selection_warns_and_continues() {
        let a = source(3, "A");
        let b = source(2, "B");
        let selections = [
            MergeSelection { source: &a, spec: "7-9, abc" },
            MergeSelection { source: &b, spec: "" },
        ];
        let assembly = assemble_merge(&selections, MERGED_NAME, ParseMode::Lenient).unwrap();

        assert_eq!(
            assembly.warnings,
            vec![Warning::EmptySelection {
                source: "A.pdf".to_string(),
                spec: "7-9, abc".to_string(),
            }]
        );
        assert_eq!(assembly.outputs[0].pages.len(), 2);
    }

    #[test]
    fn test_merge_nothing_selected_has_no_output() {
        let a = source(3, "A");
        let selections = [MergeSelection { source: &a, spec: "10" }];
        let assembly = assemble_merge(&selections, MERGED_NAME, ParseMode::Lenient).unwrap();
        assert!(assembly.outputs.is_empty());
        assert_eq!(assembly.warnings.len(), 1);
    }

    #[test]
    fn test_merge_strict_rejects_bad_token() {
        let a = source(3, "A");
        let selections = [MergeSelection { source: &a, spec: "1, x" }];
        let err = assemble_merge(&selections, MERGED_NAME, ParseMode::Strict).unwrap_err();
        assert!(matches!(err, PageError::InvalidToken(_)));
    }

    #[test]
    fn test_full_split_names_by_page() {
        let a = source(3, "A");
        let assembly = assemble_split(&a, "", DEFAULT_SPLIT_BASE, ParseMode::Lenient).unwrap();

        let names: Vec<&str> = assembly.outputs.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["split_pdf_page_1.pdf", "split_pdf_page_2.pdf", "split_pdf_page_3.pdf"]
        );
        assert!(assembly.outputs.iter().all(|o| o.pages.len() == 1));
    }

    #[test]
    fn test_split_by_groups() {
        let a = source(10, "A");
        let assembly =
            assemble_split(&a, "1-5; 6-10; ; 1, 3", DEFAULT_SPLIT_BASE, ParseMode::Lenient)
                .unwrap();

        let names: Vec<&str> = assembly.outputs.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "split_pdf_pages_1-5.pdf",
                "split_pdf_pages_6-10.pdf",
                "split_pdf_pages_1, 3.pdf"
            ]
        );
        assert_eq!(assembly.outputs[0].pages.len(), 5);
        assert_eq!(assembly.outputs[2].pages.len(), 2);
    }

    #[test]
    fn test_split_empty_group_warns() {
        let a = source(4, "A");
        let assembly = assemble_split(&a, "1-2; 50-60", "doc", ParseMode::Lenient).unwrap();
        assert_eq!(assembly.outputs.len(), 1);
        assert_eq!(
            assembly.warnings,
            vec![Warning::EmptySelection {
                source: "A.pdf".to_string(),
                spec: "50-60".to_string(),
            }]
        );
    }

    #[test]
    fn test_split_duplicate_groups_get_unique_names() {
        let a = source(4, "A");
        let assembly = assemble_split(&a, "1-2;1-2;1-2", "doc", ParseMode::Lenient).unwrap();
        let names: Vec<&str> = assembly.outputs.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["doc_pages_1-2.pdf", "doc_pages_1-2_2.pdf", "doc_pages_1-2_3.pdf"]
        );
    }

    #[test]
    fn test_split_sanitizes_base_name() {
        let a = source(2, "A");
        let assembly = assemble_split(&a, "", "../evil/x", ParseMode::Lenient).unwrap();
        let names: Vec<&str> = assembly.outputs.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec![".._evil_x_page_1.pdf", ".._evil_x_page_2.pdf"]);

        let assembly = assemble_split(&a, "1-2", r"dir\base", ParseMode::Lenient).unwrap();
        assert_eq!(assembly.outputs[0].name, "dir_base_pages_1-2.pdf");
    }

    #[test]
    fn test_rotated_keeps_all_pages() {
        let a = source(3, "A");
        let assembly = assemble_rotated(&a, Rotation::Left, "rotated_A.pdf");
        assert_eq!(assembly.outputs.len(), 1);
        assert!(assembly.outputs[0]
            .pages
            .iter()
            .all(|p| p.rotation() == Rotation::Left));
        assert_eq!(assembly.outputs[0].pages.len(), 3);
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name(r#"1/2\3*4?5:6"7<8>9|"#), "1_2_3_4_5_6_7_8_9_");
        assert_eq!(sanitize_name("1-5, 7"), "1-5, 7");
    }

    proptest! {
        #[test]
        fn full_split_is_one_page_per_output(pages in 0u32..12) {
            let a = source(pages, "P");
            let assembly = assemble_split(&a, " ", "p", ParseMode::Lenient).unwrap();
            prop_assert_eq!(assembly.outputs.len(), pages as usize);
            for (n, output) in assembly.outputs.iter().enumerate() {
                prop_assert_eq!(output.pages.len(), 1);
                prop_assert_eq!(output.pages[0].index(), n as u32);
            }
        }

        #[test]
        fn merge_never_reorders_sources(spec_a in "[0-9 ,-]{0,12}", spec_b in "[0-9 ,-]{0,12}") {
            let a = source(6, "A");
            let b = source(4, "B");
            let selections = [
                MergeSelection { source: &a, spec: &spec_a },
                MergeSelection { source: &b, spec: &spec_b },
            ];
            let assembly = assemble_merge(&selections, MERGED_NAME, ParseMode::Lenient).unwrap();
            let pages: Vec<(String, u32)> = assembly
                .outputs
                .first()
                .map(pages_of)
                .unwrap_or_default();

            let first_b = pages.iter().position(|(name, _)| name == "B.pdf").unwrap_or(pages.len());
            prop_assert!(pages[..first_b].iter().all(|(name, _)| name == "A.pdf"));
            prop_assert!(pages[first_b..].iter().all(|(name, _)| name == "B.pdf"));
            prop_assert!(pages[..first_b].windows(2).all(|w| w[0].1 < w[1].1));
            prop_assert!(pages[first_b..].windows(2).all(|w| w[0].1 < w[1].1));
        }
    }
}
