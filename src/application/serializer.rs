//! OpenPSA MEF serialization of a generated fault tree.
//!
//! The document is plain text written line by line: a comment header with the
//! parameters and resulting counts, the gate declarations in breadth-first order,
//! and the probability of every primary event in creation order.

use std::io::{self, Write};

use tracing::{debug, instrument};

use crate::domain::{FaultTree, TreeParams};

/// Writes fault trees as OpenPSA MEF documents.
pub struct MefSerializer<'a> {
    params: &'a TreeParams,
    destination: &'a str,
}

impl<'a> MefSerializer<'a> {
    /// `destination` is only recorded in the header.
    pub fn new(params: &'a TreeParams, destination: &'a str) -> Self {
        Self {
            params,
            destination,
        }
    }

    #[instrument(level = "debug", skip_all)]
    pub fn write<W: Write>(&self, tree: &FaultTree, out: &mut W) -> io::Result<()> {
        writeln!(out, "<?xml version=\"1.0\"?>")?;
        self.write_parameters(out)?;
        write_metrics(tree, out)?;

        writeln!(out, "<opsa-mef>")?;
        writeln!(
            out,
            "<define-fault-tree name=\"{}\">",
            escape_attr(&self.params.ft_name)
        )?;
        let mut declared = 0usize;
        for (_, gate) in tree.iter_breadth_first() {
            writeln!(out, "<define-gate name=\"{}\">", escape_attr(&gate.name))?;
            writeln!(out, "<{}>", gate.kind)?;
            for &event in &gate.primary_children {
                writeln!(
                    out,
                    "<basic-event name=\"{}\"/>",
                    escape_attr(&tree.event(event).name)
                )?;
            }
            for &child in &gate.gate_children {
                writeln!(out, "<gate name=\"{}\"/>", escape_attr(&tree.gate(child).name))?;
            }
            writeln!(out, "</{}>", gate.kind)?;
            writeln!(out, "</define-gate>")?;
            declared += 1;
        }
        writeln!(out, "</define-fault-tree>")?;

        writeln!(out, "<model-data>")?;
        for (_, event) in tree.events() {
            writeln!(
                out,
                "<define-basic-event name=\"{}\">",
                escape_attr(&event.name)
            )?;
            writeln!(out, "<float value=\"{}\"/>", float_literal(event.probability))?;
            writeln!(out, "</define-basic-event>")?;
        }
        writeln!(out, "</model-data>")?;
        write!(out, "</opsa-mef>")?;

        debug!(gates = declared, events = tree.num_events(), "document written");
        Ok(())
    }

    /// Serialize into an in-memory string.
    pub fn render(&self, tree: &FaultTree) -> io::Result<String> {
        let mut buf = Vec::new();
        self.write(tree, &mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn write_parameters<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let p = self.params;
        let lines = [
            ("The name of the fault tree", p.ft_name.clone()),
            ("The name of the root gate", p.root.clone()),
            ("The seed of a random number generator", p.seed.to_string()),
            ("The number of unique primary events", p.nprimary.to_string()),
            ("The average number of children per gate", p.nchildren.to_string()),
            ("Primary events to gates ratio per new node", float_literal(p.ratio)),
            (
                "Approximate percentage of repeated primary events in the tree",
                float_literal(p.reuse_p),
            ),
            (
                "Approximate percentage of repeated gates in the tree",
                float_literal(p.reuse_g),
            ),
            ("Maximum probability for primary events", float_literal(p.maxprob)),
            ("Minimum probability for primary events", float_literal(p.minprob)),
            (
                "Minimal number of primary events for the root node",
                p.ptop.to_string(),
            ),
            ("Fixed number of children for the root node", p.ctop.to_string()),
            (
                "Name of a file to write the fault tree",
                self.destination.to_string(),
            ),
        ];

        writeln!(out, "<!--")?;
        writeln!(out, "This is an autogenerated fault tree description")?;
        writeln!(out, "with the following parameters:")?;
        writeln!(out)?;
        for (label, value) in lines {
            writeln!(out, "{}: {}", label, escape_comment(&value))?;
        }
        writeln!(out, "-->")
    }
}

fn write_metrics<W: Write>(tree: &FaultTree, out: &mut W) -> io::Result<()> {
    let events = tree.num_events();
    let gates = tree.num_gates();
    writeln!(out, "<!--")?;
    writeln!(out, "The generated fault tree has the following metrics:")?;
    writeln!(out)?;
    writeln!(out, "The number of primary events: {}", events)?;
    writeln!(out, "The number of gates: {}", gates)?;
    writeln!(
        out,
        "Primary events to gates ratio: {}",
        float_literal(events as f64 / gates as f64)
    )?;
    writeln!(out, "-->")?;
    writeln!(out)
}

/// Shortest round-trip representation, always with a fractional part (`2.0`).
pub fn float_literal(value: f64) -> String {
    format!("{value:?}")
}

/// Escape a string for use inside a double-quoted XML attribute.
pub fn escape_attr(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// XML comments must not contain `--`.
fn escape_comment(raw: &str) -> String {
    let mut text = raw.to_string();
    while text.contains("--") {
        text = text.replace("--", "- -");
    }
    text
}
