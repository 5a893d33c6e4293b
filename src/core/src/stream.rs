//! Streaming archive rewrite.
//!
//! Reads the input archive one member at a time and writes each member to
//! the output archive as soon as it has been transformed. Only the layer
//! metadata record is ever held in memory in full.

use std::io::{self, Read, Write};

use tar::{Archive, Builder, Entry, EntryType, Header};

use crate::config::RetagConfig;
use crate::error::{Result, RetagError};
use crate::metadata::{is_metadata_member, patch_metadata, MetadataPatch};
use crate::rename::MemberPath;

/// Width of the `name` and `linkname` header fields.
const NAME_FIELD_LEN: usize = 100;

/// Name of the GNU extension records carrying long names.
const LONG_NAME_RECORD: &[u8] = b"././@LongLink";

/// Upper bound on the buffer reserved up front for the metadata record.
const METADATA_CAPACITY: u64 = 64 * 1024;

/// What happened to the `<new-id>/json` metadata record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataOutcome {
    /// No metadata record was seen
    #[default]
    Absent,
    /// Record `id` matched and overrides were merged
    Patched,
    /// Record parsed but belonged to another id; re-encoded as is
    Reencoded,
    /// Record could not be parsed; original bytes copied
    PassedThrough,
}

/// Counters for one run over an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetagSummary {
    /// Members written to the output
    pub members: usize,
    /// Members whose path was under the old identifier
    pub renamed: usize,
    pub metadata: MetadataOutcome,
}

/// Copy `input` to `output`, renaming members under the old identifier and
/// patching the layer metadata record.
///
/// The output archive is finished and flushed on success. On error the
/// writer is dropped, which still appends the end-of-archive marker to
/// whatever was written so far.
pub fn retag_archive<R: Read, W: Write>(
    input: R,
    output: W,
    config: &RetagConfig,
) -> Result<RetagSummary> {
    let mut archive = Archive::new(input);
    let mut builder = Builder::new(output);
    let mut summary = RetagSummary::default();

    for entry in archive.entries()? {
        let mut entry = entry?;
        copy_member(&mut entry, &mut builder, config, &mut summary)?;
    }

    let mut output = builder.into_inner()?;
    output.flush()?;

    tracing::debug!(
        members = summary.members,
        renamed = summary.renamed,
        metadata = ?summary.metadata,
        "Archive rewritten"
    );

    Ok(summary)
}

fn copy_member<R: Read, W: Write>(
    entry: &mut Entry<'_, R>,
    builder: &mut Builder<W>,
    config: &RetagConfig,
    summary: &mut RetagSummary,
) -> Result<()> {
    let mut header = entry.header().clone();
    let kind = header.entry_type();
    let mut path = MemberPath::new(entry.path_bytes().into_owned());
    let link_name = entry.link_name_bytes().map(|l| l.into_owned());

    if kind.is_gnu_sparse() {
        return Err(RetagError::UnsupportedMember {
            path: path.display(),
            kind: "GNU sparse".to_string(),
        });
    }

    let size = content_size(entry, &header)?;
    let renamed = path.rename(config);
    if renamed {
        summary.renamed += 1;
        tracing::debug!(path = %path.display(), "Renamed member");
    }

    // Extension records already consumed by the reader (long names, pax
    // sizes) are lost if the header is written back verbatim.
    let verbatim = !renamed
        && &*header.path_bytes() == path.as_bytes()
        && header.link_name_bytes().as_deref() == link_name.as_deref()
        && header.size()? == size;
    let link = link_name.as_deref();

    if !has_content(kind) {
        if header.size()? != 0 {
            header.set_size(0);
            header.set_cksum();
        }
        write_member(builder, &mut header, &path, link, verbatim, io::empty())?;
    } else if renamed && is_regular(kind) && is_metadata_member(path.as_bytes(), &config.new_id) {
        // The header size is untrusted until the data has actually been read.
        let mut content = Vec::with_capacity(size.min(METADATA_CAPACITY) as usize);
        entry.read_to_end(&mut content)?;
        if content.len() as u64 != size {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "{} is truncated: expected {size} bytes, got {}",
                    path.display(),
                    content.len()
                ),
            )
            .into());
        }

        let content = match patch_metadata(&content, config) {
            Ok(patch) => {
                summary.metadata = match patch {
                    MetadataPatch::Patched(_) => MetadataOutcome::Patched,
                    MetadataPatch::Reencoded(_) => MetadataOutcome::Reencoded,
                };
                patch.into_bytes()
            }
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %e,
                    "Copying layer metadata unchanged"
                );
                summary.metadata = MetadataOutcome::PassedThrough;
                content
            }
        };

        header.set_size(content.len() as u64);
        write_member(builder, &mut header, &path, link, false, content.as_slice())?;
    } else {
        if header.size()? != size {
            header.set_size(size);
        }
        write_member(builder, &mut header, &path, link, verbatim, entry)?;
    }

    summary.members += 1;
    Ok(())
}

/// Size of the member's data, honouring a pax `size` record.
fn content_size<R: Read>(entry: &mut Entry<'_, R>, header: &Header) -> Result<u64> {
    if let Some(extensions) = entry.pax_extensions()? {
        for extension in extensions {
            let extension = extension?;
            if extension.key() != Ok("size") {
                continue;
            }
            if let Some(size) = extension.value().ok().and_then(|v| v.parse().ok()) {
                return Ok(size);
            }
        }
    }
    Ok(header.size()?)
}

/// Write one member, reusing the input header bytes when nothing about the
/// name or size changed.
///
/// Otherwise the names are stored as raw bytes, with GNU long name records
/// when they do not fit the header. Names are never normalized, so absolute
/// paths and `..` components survive the copy.
fn write_member<W: Write, D: Read>(
    builder: &mut Builder<W>,
    header: &mut Header,
    path: &MemberPath,
    link_name: Option<&[u8]>,
    verbatim: bool,
    data: D,
) -> io::Result<()> {
    if !verbatim {
        append_long_name(builder, EntryType::GNULongName, path.as_bytes())?;
        set_name_field(&mut header.as_old_mut().name, path.as_bytes());
        if let Some(ustar) = header.as_ustar_mut() {
            ustar.prefix = [0; 155];
        }
        if let Some(target) = link_name {
            append_long_name(builder, EntryType::GNULongLink, target)?;
            set_name_field(&mut header.as_old_mut().linkname, target);
        }
        header.set_cksum();
    }
    builder.append(header, data)
}

/// Emit a `././@LongLink` record for a name longer than the header field.
fn append_long_name<W: Write>(
    builder: &mut Builder<W>,
    kind: EntryType,
    name: &[u8],
) -> io::Result<()> {
    if name.len() <= NAME_FIELD_LEN {
        return Ok(());
    }

    let mut header = Header::new_gnu();
    set_name_field(&mut header.as_old_mut().name, LONG_NAME_RECORD);
    header.set_mode(0o644);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mtime(0);
    // GNU tar counts the terminating NUL
    header.set_size(name.len() as u64 + 1);
    header.set_entry_type(kind);
    header.set_cksum();
    builder.append(&header, name.chain(&[0u8][..]))
}

/// Store `name` in a fixed-width header field, truncated and NUL padded.
fn set_name_field(field: &mut [u8], name: &[u8]) {
    let len = name.len().min(field.len());
    field.fill(0);
    field[..len].copy_from_slice(&name[..len]);
}

/// Whether the member type carries a data stream in the archive.
fn has_content(kind: EntryType) -> bool {
    !(kind.is_dir()
        || is_link(kind)
        || kind.is_character_special()
        || kind.is_block_special()
        || kind.is_fifo())
}

fn is_link(kind: EntryType) -> bool {
    kind.is_symlink() || kind.is_hard_link()
}

fn is_regular(kind: EntryType) -> bool {
    kind.is_file() || kind.is_contiguous()
}
