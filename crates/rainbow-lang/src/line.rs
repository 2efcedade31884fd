use std::collections::BTreeMap;
use std::io::{self, Write};
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use crate::arena::{Arena, ArenaId};
use crate::encoder::Encoder;
use crate::error::Error;
use crate::interval::Interval;
use crate::program::Program;
use crate::properties::Properties;

pub type SegmentId = ArenaId<Segment>;

/// A run of bytes of the line sharing the same properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub interval: Interval,
    pub properties: Properties,
    next: Option<SegmentId>,
}

/// Storage of line segments, recycled from one line to the next.
#[derive(Debug, Default)]
pub struct SegmentPool {
    segments: Arena<Segment>,
}

impl SegmentPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, interval: Interval, properties: Properties) -> SegmentId {
        self.segments.alloc(Segment {
            interval,
            properties,
            next: None,
        })
    }

    /// Releases every segment at once. Their storage is reused by later allocations.
    pub fn recycle(&mut self) {
        self.segments.clear();
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.segments.capacity()
    }
}

impl Index<SegmentId> for SegmentPool {
    type Output = Segment;

    fn index(&self, id: SegmentId) -> &Segment {
        &self.segments[id]
    }
}

impl IndexMut<SegmentId> for SegmentPool {
    fn index_mut(&mut self, id: SegmentId) -> &mut Segment {
        &mut self.segments[id]
    }
}

/// Splits one line into segments carrying the properties assigned by a program.
///
/// The segments always tile the line: they are ordered, disjoint and cover
/// every byte. A composer is meant to be reused for every line of a stream:
///
/// ```
/// use rainbow_lang::{LineComposer, Program, encoder};
///
/// let mut program: Program = r#"{
///     filter: { name: num regexp: "(\d+)" properties: { 1: { color: red } } }
///     apply: { filters: num }
/// }"#.parse().unwrap();
///
/// let mut line = LineComposer::new();
/// let mut out = Vec::new();
/// line.init(b"take 5".to_vec());
/// line.apply_program(&mut program).unwrap();
/// line.output(&mut out, Box::new(encoder::Debug)).unwrap();
///
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "fg:none,bg:none,mod:[]                  {take }\n\
///      fg:red,bg:none,mod:[]                   {5}\n\
///      fg:none,bg:none,mod:[]                  {\n}\n"
/// );
/// ```
#[derive(Debug)]
pub struct LineComposer {
    line: Rc<[u8]>,
    index: BTreeMap<usize, SegmentId>,
    pool: SegmentPool,
    head: Option<SegmentId>,
}

impl Default for LineComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineComposer {
    pub fn new() -> Self {
        let mut composer = Self {
            line: Rc::from(Vec::new()),
            index: BTreeMap::new(),
            pool: SegmentPool::new(),
            head: None,
        };
        composer.init(Vec::new());
        composer
    }

    /// Starts a new line made of a single segment without properties.
    ///
    /// The buffer becomes shared with the match history of the program and is
    /// never written to again.
    pub fn init(&mut self, line: Vec<u8>) {
        self.line = Rc::from(line);
        self.index.clear();
        self.pool.recycle();

        let id = self
            .pool
            .alloc(Interval::new(0, self.line.len()), Properties::default());
        self.index.insert(0, id);
        self.head = Some(id);
    }

    pub fn line(&self) -> &[u8] {
        &self.line
    }

    pub(crate) fn shared_line(&self) -> Rc<[u8]> {
        Rc::clone(&self.line)
    }

    pub fn pool(&self) -> &SegmentPool {
        &self.pool
    }

    /// Runs every apply statement of `program` over the current line.
    pub fn apply_program(&mut self, program: &mut Program) -> Result<(), Error> {
        program.run(self)
    }

    /// Merges `properties` into the bytes covered by `interval`, splitting
    /// segments at the interval boundaries.
    ///
    /// # Panics
    ///
    /// Panics if `interval` reaches past the end of the line or the segments
    /// no longer tile the line.
    pub fn splice(&mut self, mut interval: Interval, properties: &Properties) {
        if interval.is_empty() {
            return;
        }
        tracing::trace!(%interval, %properties, "splice");

        let Some((_, &found)) = self.index.range(..=interval.beg).next_back() else {
            panic!("no line segment starts at or before offset {}", interval.beg);
        };
        assert!(
            self.pool[found].interval.overlaps(&interval),
            "line segment {} does not overlap {}",
            self.pool[found].interval,
            interval
        );

        let mut current = found;
        if self.pool[current].interval.beg < interval.beg {
            current = self.split(current, interval.beg);
        }

        loop {
            let segment = &mut self.pool[current];
            if segment.interval.end <= interval.end {
                segment.properties.merge(properties);
                interval.beg = segment.interval.end;
                if interval.is_empty() {
                    break;
                }
                let Some(next) = segment.next else {
                    panic!(
                        "line segments end at offset {} before {}",
                        interval.beg, interval.end
                    );
                };
                assert_eq!(
                    self.pool[next].interval.beg,
                    interval.beg,
                    "line segments are not contiguous"
                );
                current = next;
            } else {
                self.split(current, interval.end);
                self.pool[current].properties.merge(properties);
                break;
            }
        }
    }

    /// Cuts segment `id` at `at`, returning the new tail which keeps the properties.
    fn split(&mut self, id: SegmentId, at: usize) -> SegmentId {
        let segment = self.pool[id];
        let tail = self
            .pool
            .alloc(Interval::new(at, segment.interval.end), segment.properties);
        self.pool[tail].next = segment.next;

        let segment = &mut self.pool[id];
        segment.interval.end = at;
        segment.next = Some(tail);

        self.index.insert(at, tail);
        tail
    }

    /// The segments of the line in order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        std::iter::successors(self.head, |&id| self.pool[id].next).map(|id| &self.pool[id])
    }

    /// Hands every segment to the encoder, then a final newline without properties.
    pub fn output(&self, w: &mut dyn Write, encoder: Box<dyn Encoder>) -> io::Result<()> {
        let mut encoder = encoder;
        for segment in self.segments() {
            encoder = encoder.encode(w, &segment.properties, &self.line[segment.interval.range()])?;
        }
        encoder.encode(w, &Properties::default(), b"\n")?;
        Ok(())
    }
}
