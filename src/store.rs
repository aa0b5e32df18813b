use crate::{
    codec::{Codec, Record, RecordHeader},
    config::StoreOptions,
    core::{Bytes, KeyRef, Offset},
    error::{DukaError, DukaResult},
    index::Index,
    utils::t,
};
use contracts::*;
use std::{
    collections::BTreeMap,
    fs::{File, OpenOptions},
    io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

/// Append-only log store.
///
/// Owns the backing log file and an in-memory [`Index`] from key to the
/// byte offset of that key's latest record. The log is the source of
/// truth; the index only short-circuits lookups and can always be
/// rebuilt from the log with [`LogStore::reindex`].
///
/// The store assumes exclusive ownership of its log file and is driven
/// by a single actor: all operations take `&mut self` and there is no
/// internal locking. A concurrent host must serialize access.
pub struct LogStore {
    /// Record reader, seeks freely for indexed lookups.
    rdr: BufReader<File>,
    /// Record writer, opened in append mode.
    wtr: BufWriter<File>,
    /// Write offset, always at end of log.
    w_off: Offset,
    /// Key to latest-record-offset cache.
    index: Index,
    /// Log path on disk.
    path: PathBuf,
    /// Configuration.
    conf: StoreOptions,
    /// Record encoder and decoder.
    codec: Codec,
}

impl LogStore {
    /// Opens the log at `path`, creating it when absent.
    ///
    /// The index starts empty regardless of log contents; call
    /// [`LogStore::reindex`] to warm it eagerly. Startup cost is
    /// therefore constant, never proportional to log size.
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        options: Option<StoreOptions>,
    ) -> DukaResult<LogStore> {
        let conf = options.unwrap_or_else(|| StoreOptions::builder().build());
        let path = path.as_ref().to_path_buf();
        let (rdr, wtr, w_off) = Self::open_handles(&path)?;
        debug!("opened log at: {} w_off: {w_off}", path.display());
        Ok(LogStore {
            rdr,
            wtr,
            w_off,
            index: Index::new(),
            path,
            conf,
            codec: Codec::new(conf.compress),
        })
    }

    /// Appends a record for `key` at the end of the log and returns the
    /// byte offset it starts at.
    ///
    /// The index entry for `key` is updated synchronously, so the very
    /// next lookup takes the indexed path.
    #[debug_ensures(ret.is_err() || self.w_off > old(self.w_off), "w_off did not advance")]
    #[debug_ensures(ret.is_err() || self.index.contains(key), "index entry not set")]
    pub fn append(&mut self, key: KeyRef, val: &[u8]) -> DukaResult<Offset> {
        let offset = self.w_off;
        let rec = Record::new(key.to_vec(), val.to_vec());
        let frame = self.codec.encode(&rec)?;
        t!("store::write", self.write_frame(&frame))?;
        self.w_off += frame.len() as Offset;
        self.index.set(key.to_vec(), offset);
        Ok(offset)
    }

    /// Returns the value of the most recent record for `key`, or `None`
    /// when the key was never written.
    ///
    /// When the index holds an offset for `key` the store seeks straight
    /// to it and decodes exactly one record. Otherwise the whole log is
    /// scanned forward, the last match wins, and its offset is cached
    /// for next time. A miss leaves the index untouched: there is no
    /// negative caching.
    pub fn get_latest(&mut self, key: KeyRef) -> DukaResult<Option<Bytes>> {
        if let Some(offset) = self.index.lookup(key) {
            let rec = t!("store::read_at", self.read_at(offset))?;
            debug_assert_eq!(rec.key, key, "index points at wrong record");
            return Ok(Some(rec.val));
        }
        let mut latest: Option<(Offset, Bytes)> = None;
        for item in self.scan()? {
            let (offset, rec) = item?;
            if rec.key == key {
                latest = Some((offset, rec.val));
            }
        }
        Ok(match latest {
            Some((offset, val)) => {
                self.index.set(key.to_vec(), offset);
                Some(val)
            }
            None => None,
        })
    }

    /// Rebuilds the index from scratch with one full scan of the log.
    ///
    /// Recovery path for a store whose index is known empty or stale,
    /// typically right after reopening an existing log. Later records
    /// overwrite earlier ones, matching [`LogStore::get_latest`]
    /// semantics. The log itself is not rewritten.
    pub fn reindex(&mut self) -> DukaResult<()> {
        self.index.clear();
        for item in self.scan()? {
            let (offset, rec) = item?;
            self.index.set(rec.key, offset);
        }
        debug!("reindexed {} keys", self.index.len());
        Ok(())
    }

    /// Rewrites only the latest record of each key into a fresh log at
    /// `target` and switches the store over to it.
    ///
    /// `target` must name a fresh log, distinct from the current one.
    /// The survivor set is written out completely before the store
    /// touches its own handles, so a failed compaction leaves the store
    /// on the intact pre-compaction log. After compaction `get_latest`
    /// answers exactly as it did before, and the new log holds one
    /// record per unique key. The whole set of surviving pairs is
    /// buffered in memory, which bounds the unique key count this can
    /// handle; segmented compaction is future work.
    #[debug_requires(target.as_ref() != self.path.as_path(), "compaction target must differ from the current log")]
    pub fn compact<P: AsRef<Path>>(&mut self, target: P) -> DukaResult<()> {
        let mut latest: BTreeMap<Bytes, Bytes> = BTreeMap::new();
        let mut total = 0usize;
        for item in self.scan()? {
            let (_offset, rec) = item?;
            latest.insert(rec.key, rec.val);
            total += 1;
        }
        let target = target.as_ref().to_path_buf();
        debug!(
            "compacting {total} records into {} at: {}",
            latest.len(),
            target.display()
        );
        let (rdr, mut wtr, mut w_off) = Self::open_handles(&target)?;
        let mut entries: Vec<(Bytes, Offset)> = Vec::with_capacity(latest.len());
        for (key, val) in latest {
            let rec = Record::new(key, val);
            let frame = self.codec.encode(&rec)?;
            wtr.write_all(&frame).map_err(DukaError::WriteFailure)?;
            entries.push((rec.key, w_off));
            w_off += frame.len() as Offset;
        }
        wtr.flush().map_err(DukaError::WriteFailure)?;
        if self.conf.sync {
            wtr.get_ref().sync_all().map_err(DukaError::WriteFailure)?;
        }
        self.rdr = rdr;
        self.wtr = wtr;
        self.w_off = w_off;
        self.path = target;
        self.index.clear();
        for (key, offset) in entries {
            self.index.set(key, offset);
        }
        Ok(())
    }

    /// Flushes buffered writes and syncs the log file to disk.
    pub fn sync(&mut self) -> DukaResult<()> {
        self.wtr.flush().map_err(DukaError::WriteFailure)?;
        self.wtr
            .get_ref()
            .sync_all()
            .map_err(DukaError::WriteFailure)?;
        Ok(())
    }

    fn open_handles(path: &Path) -> DukaResult<(BufReader<File>, BufWriter<File>, Offset)> {
        let mut wtr = BufWriter::new(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(DukaError::WriteFailure)?,
        );
        let rdr = BufReader::new(
            OpenOptions::new()
                .read(true)
                .open(path)
                .map_err(DukaError::ReadFailure)?,
        );
        wtr.seek(SeekFrom::End(0)).map_err(DukaError::WriteFailure)?;
        let w_off = wtr.stream_position().map_err(DukaError::WriteFailure)?;
        Ok((rdr, wtr, w_off))
    }

    fn write_frame(&mut self, frame: &[u8]) -> DukaResult<()> {
        self.wtr.write_all(frame).map_err(DukaError::WriteFailure)?;
        // flush so the separate read handle sees the bytes
        self.wtr.flush().map_err(DukaError::WriteFailure)?;
        if self.conf.sync {
            self.wtr
                .get_ref()
                .sync_all()
                .map_err(DukaError::WriteFailure)?;
        }
        Ok(())
    }

    /// Reads exactly one record starting at `offset`.
    fn read_at(&mut self, offset: Offset) -> DukaResult<Record> {
        self.rdr
            .seek(SeekFrom::Start(offset))
            .map_err(DukaError::ReadFailure)?;
        let mut frame = vec![0u8; RecordHeader::serde_sz()];
        self.rdr.read_exact(&mut frame).map_err(map_read_err)?;
        let header: RecordHeader = Codec::deser_raw(&frame)?;
        let mut body = vec![0u8; header.len as usize];
        self.rdr.read_exact(&mut body).map_err(map_read_err)?;
        frame.extend_from_slice(&body);
        self.codec.decode(&frame)
    }

    fn scan(&mut self) -> DukaResult<RecordReader> {
        RecordReader::from_path(&self.path)
    }
}

impl Drop for LogStore {
    fn drop(&mut self) {
        t!(
            "store::drop_flush",
            self.wtr.flush().map_err(DukaError::WriteFailure)
        )
        .ok();
    }
}

fn map_read_err(e: std::io::Error) -> DukaError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        DukaError::MalformedRecord("record truncated".into())
    } else {
        DukaError::ReadFailure(e)
    }
}

/// Streaming forward reader over a log file.
///
/// Yields each record with the byte offset it starts at. A clean end of
/// file at a frame boundary ends the iteration; end of file inside a
/// frame is a malformed record, since offset bookkeeping depends on
/// exact record boundaries.
pub(crate) struct RecordReader {
    rdr: BufReader<File>,
    codec: Codec,
    off: Offset,
}

impl RecordReader {
    pub fn from_path(path: &Path) -> DukaResult<Self> {
        let rdr = BufReader::new(
            OpenOptions::new()
                .read(true)
                .open(path)
                .map_err(DukaError::ReadFailure)?,
        );
        Ok(Self {
            rdr,
            codec: Codec::new(false),
            off: 0,
        })
    }

    pub fn next_record(&mut self) -> DukaResult<Option<(Offset, Record)>> {
        let offset = self.off;
        let header = match self.read_header()? {
            Some(header) => header,
            None => return Ok(None),
        };
        let mut body = vec![0u8; header.len as usize];
        self.rdr.read_exact(&mut body).map_err(map_read_err)?;
        let rec = self.codec.de_body(&body, header.compressed)?;
        self.off += (RecordHeader::serde_sz() + header.len as usize) as Offset;
        Ok(Some((offset, rec)))
    }

    /// Reads the next header, distinguishing clean end of file from a
    /// header cut short.
    fn read_header(&mut self) -> DukaResult<Option<RecordHeader>> {
        let mut buf = vec![0u8; RecordHeader::serde_sz()];
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.rdr.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DukaError::ReadFailure(e)),
            }
        }
        if filled == 0 {
            return Ok(None);
        }
        if filled < buf.len() {
            return Err(DukaError::MalformedRecord(
                "record header truncated".into(),
            ));
        }
        Ok(Some(Codec::deser_raw(&buf)?))
    }
}

impl Iterator for RecordReader {
    type Item = DukaResult<(Offset, Record)>;
    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(None) => None,
            Ok(Some(val)) => Some(Ok(val)),
            Err(e) => Some(Err(e)),
        }
    }
}
