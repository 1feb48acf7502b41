use std::{collections::HashMap, sync::Arc};

use crate::{Capability, Entity, EntityId, Narrative, Player};

// Partition

/// Disjoint membership groups of a [`Container`](crate::Container).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Enabled entities with the [`Player`] capability
    Players,
    /// Enabled entities that are neither players nor scenery
    Others,
    /// Enabled entities with the [`Narrative`] capability
    Fixtures,
    /// Entities held but out of play
    Disabled,
}

impl Partition {
    pub const ALL: [Partition; 4] = [
        Partition::Players,
        Partition::Others,
        Partition::Fixtures,
        Partition::Disabled,
    ];

    /// Order in which searches visit partitions.
    pub const SEARCH_ORDER: [Partition; 3] =
        [Partition::Players, Partition::Others, Partition::Fixtures];

    /// The active partition an enabled `entity` belongs in.
    pub fn active_for(entity: &Entity) -> Partition {
        if entity.has(Player::KIND) {
            Partition::Players
        } else if entity.has(Narrative::KIND) {
            Partition::Fixtures
        } else {
            Partition::Others
        }
    }

    pub fn is_active(&self) -> bool {
        *self != Partition::Disabled
    }

    fn index(&self) -> usize {
        match self {
            Partition::Players => 0,
            Partition::Others => 1,
            Partition::Fixtures => 2,
            Partition::Disabled => 3,
        }
    }

    fn head(&self) -> usize {
        self.index() * 2
    }

    fn tail(&self) -> usize {
        self.index() * 2 + 1
    }
}

/// Slot of a member's list node. Stays the same while the member moves
/// between partitions of one container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey(usize);

const SENTINELS: usize = Partition::ALL.len() * 2;

struct Node {
    entity: Option<Arc<Entity>>,
    partition: Partition,
    prev: usize,
    next: usize,
}

// Partitions

/// Four doubly linked lists sharing one slot arena. Each list is bracketed by
/// permanent head and tail sentinels, so linking never branches on emptiness.
pub(crate) struct Partitions {
    nodes: Vec<Node>,
    vacant: Vec<usize>,
    index: HashMap<EntityId, usize>,
    lens: [usize; 4],
}

impl Partitions {
    pub(crate) fn new() -> Self {
        let mut nodes = Vec::with_capacity(SENTINELS);
        for partition in Partition::ALL {
            // head, then tail
            nodes.push(Node {
                entity: None,
                partition,
                prev: partition.head(),
                next: partition.tail(),
            });
            nodes.push(Node {
                entity: None,
                partition,
                prev: partition.head(),
                next: partition.tail(),
            });
        }
        Self {
            nodes,
            vacant: Vec::new(),
            index: HashMap::new(),
            lens: [0; 4],
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    pub(crate) fn partition_len(&self, partition: Partition) -> usize {
        self.lens[partition.index()]
    }

    pub(crate) fn contains(&self, id: &EntityId) -> bool {
        self.index.contains_key(id)
    }

    pub(crate) fn node_of(&self, id: &EntityId) -> Option<NodeKey> {
        self.index.get(id).copied().map(NodeKey)
    }

    pub(crate) fn partition_of(&self, id: &EntityId) -> Option<Partition> {
        self.index.get(id).map(|slot| self.nodes[*slot].partition)
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<&Arc<Entity>> {
        self.index
            .get(id)
            .and_then(|slot| self.nodes[*slot].entity.as_ref())
    }

    /// Links `entity` at the back of `partition`. Returns `false` if it is
    /// already a member.
    pub(crate) fn insert(&mut self, entity: Arc<Entity>, partition: Partition) -> bool {
        let id = entity.id();
        if self.index.contains_key(&id) {
            return false;
        }
        let node = Node {
            entity: Some(entity),
            partition,
            prev: partition.head(),
            next: partition.tail(),
        };
        let slot = match self.vacant.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.link_back(slot, partition);
        self.index.insert(id, slot);
        true
    }

    /// Moves a member's node to the back of `partition` without reallocating
    /// it. Returns the partition it left.
    pub(crate) fn relink(&mut self, id: &EntityId, partition: Partition) -> Option<Partition> {
        let slot = *self.index.get(id)?;
        let from = self.nodes[slot].partition;
        if from == partition {
            return Some(from);
        }
        self.unlink(slot);
        self.link_back(slot, partition);
        Some(from)
    }

    pub(crate) fn remove(&mut self, id: &EntityId) -> Option<(Arc<Entity>, Partition)> {
        let slot = self.index.remove(id)?;
        self.unlink(slot);
        let node = &mut self.nodes[slot];
        let partition = node.partition;
        let entity = node.entity.take()?;
        self.vacant.push(slot);
        Some((entity, partition))
    }

    /// Members of `partition`, front to back.
    pub(crate) fn iter(&self, partition: Partition) -> PartitionIter<'_> {
        PartitionIter {
            nodes: &self.nodes,
            cursor: self.nodes[partition.head()].next,
            tail: partition.tail(),
        }
    }

    /// Empties every partition, returning members with the partition they
    /// were in.
    pub(crate) fn drain(&mut self) -> Vec<(Arc<Entity>, Partition)> {
        let mut members = Vec::with_capacity(self.len());
        for partition in Partition::ALL {
            members.extend(self.iter(partition).map(|entity| (entity.clone(), partition)));
        }
        *self = Self::new();
        members
    }

    /// Walks every list checking links, lengths and the membership index.
    pub(crate) fn is_consistent(&self) -> bool {
        let mut seen = 0;
        for partition in Partition::ALL {
            let mut count = 0;
            let mut prev = partition.head();
            let mut cursor = self.nodes[prev].next;
            while cursor != partition.tail() {
                let node = &self.nodes[cursor];
                let Some(entity) = node.entity.as_ref() else {
                    return false;
                };
                if node.prev != prev
                    || node.partition != partition
                    || self.index.get(&entity.id()) != Some(&cursor)
                {
                    return false;
                }
                count += 1;
                prev = cursor;
                cursor = node.next;
            }
            if self.nodes[partition.tail()].prev != prev || count != self.lens[partition.index()] {
                return false;
            }
            seen += count;
        }
        seen == self.index.len()
    }

    fn link_back(&mut self, slot: usize, partition: Partition) {
        let tail = partition.tail();
        let last = self.nodes[tail].prev;
        self.nodes[last].next = slot;
        self.nodes[tail].prev = slot;

        let node = &mut self.nodes[slot];
        node.prev = last;
        node.next = tail;
        node.partition = partition;
        self.lens[partition.index()] += 1;
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next, partition) = {
            let node = &self.nodes[slot];
            (node.prev, node.next, node.partition)
        };
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.lens[partition.index()] -= 1;
    }
}

// PartitionIter
pub(crate) struct PartitionIter<'p> {
    nodes: &'p [Node],
    cursor: usize,
    tail: usize,
}

impl<'p> Iterator for PartitionIter<'p> {
    type Item = &'p Arc<Entity>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor != self.tail {
            let node = &self.nodes[self.cursor];
            self.cursor = node.next;
            if let Some(entity) = node.entity.as_ref() {
                return Some(entity);
            }
        }
        None
    }
}
