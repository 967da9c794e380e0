use crate::agent::Agent;

/// Stable handle to a live member. The generation field invalidates stale handles.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct AgentId {
    pub index: u32,
    pub generation: u32,
}

/// One evaluated individual: body, decision policy and the ledger slot its
/// fitness is credited to. Kept together so none can outlive the others.
#[derive(Clone, Debug)]
pub struct Member<C> {
    pub agent: Agent,
    pub controller: C,
    pub fitness_slot: usize,
}

/// Arena of live members with generational handles. Removing one member never
/// shifts another member's handle.
pub struct Population<C> {
    slots: Vec<Option<Member<C>>>,
    generations: Vec<u32>,
    free_list: Vec<u32>,
    count: usize,
}

impl<C> Population<C> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            generations: vec![0; capacity],
            free_list: (0..capacity as u32).rev().collect(),
            count: 0,
        }
    }

    pub fn insert(&mut self, member: Member<C>) -> AgentId {
        self.count += 1;
        if let Some(index) = self.free_list.pop() {
            let idx = index as usize;
            self.slots[idx] = Some(member);
            AgentId {
                index,
                generation: self.generations[idx],
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Some(member));
            self.generations.push(0);
            AgentId {
                index,
                generation: 0,
            }
        }
    }

    /// Removes the member behind `id`. Stale or already-removed handles are a no-op.
    pub fn remove(&mut self, id: AgentId) -> Option<Member<C>> {
        let idx = id.index as usize;
        if idx >= self.slots.len() || self.generations[idx] != id.generation {
            return None;
        }
        let member = self.slots[idx].take()?;
        self.generations[idx] += 1;
        self.free_list.push(id.index);
        self.count -= 1;
        Some(member)
    }

    pub fn get(&self, id: AgentId) -> Option<&Member<C>> {
        let idx = id.index as usize;
        if idx < self.slots.len() && self.generations[idx] == id.generation {
            self.slots[idx].as_ref()
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Member<C>> {
        let idx = id.index as usize;
        if idx < self.slots.len() && self.generations[idx] == id.generation {
            self.slots[idx].as_mut()
        } else {
            None
        }
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.get(id).is_some()
    }

    /// Live members in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &Member<C>)> {
        let generations = &self.generations;
        self.slots.iter().enumerate().filter_map(move |(i, slot)| {
            slot.as_ref().map(|m| {
                (
                    AgentId {
                        index: i as u32,
                        generation: generations[i],
                    },
                    m,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (AgentId, &mut Member<C>)> {
        let generations = &self.generations;
        self.slots.iter_mut().enumerate().filter_map(move |(i, slot)| {
            slot.as_mut().map(|m| {
                (
                    AgentId {
                        index: i as u32,
                        generation: generations[i],
                    },
                    m,
                )
            })
        })
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.iter().map(|(_, m)| &m.agent)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(slot: usize) -> Member<u32> {
        Member {
            agent: Agent::default(),
            controller: slot as u32 * 10,
            fitness_slot: slot,
        }
    }

    #[test]
    fn handles_invalidate_after_removal_and_slot_reuse() {
        let mut pop = Population::new(1);
        let a = pop.insert(member(0));
        assert!(pop.contains(a));

        assert!(pop.remove(a).is_some());
        assert!(pop.get(a).is_none());
        assert!(pop.remove(a).is_none());

        let b = pop.insert(member(1));
        assert_eq!(a.index, b.index);
        assert_ne!(a.generation, b.generation);
        assert!(pop.remove(a).is_none());
        assert_eq!(pop.len(), 1);
    }

    #[test]
    fn removing_several_members_keeps_the_rest_aligned() {
        let mut pop = Population::new(6);
        let ids: Vec<AgentId> = (0..6).map(|i| pop.insert(member(i))).collect();

        // Same pass, mixed order, including a duplicate.
        for id in [ids[4], ids[1], ids[4], ids[2]] {
            pop.remove(id);
        }

        assert_eq!(pop.len(), 3);
        assert_eq!(pop.iter().count(), pop.len());
        for (id, m) in pop.iter() {
            let original = ids.iter().position(|x| *x == id).unwrap();
            assert_eq!(m.fitness_slot, original);
            assert_eq!(m.controller, original as u32 * 10);
        }
        let survivors: Vec<usize> = pop.iter().map(|(_, m)| m.fitness_slot).collect();
        assert_eq!(survivors, vec![0, 3, 5]);
    }

    #[test]
    fn arena_grows_past_initial_capacity() {
        let mut pop = Population::new(0);
        let a = pop.insert(member(0));
        let b = pop.insert(member(1));
        assert_eq!(pop.len(), 2);
        assert_ne!(a, b);
        pop.get_mut(b).unwrap().agent.activate();
        assert_eq!(pop.get(b).unwrap().agent.tick_count, 0);
        assert_eq!(pop.ids(), vec![a, b]);
    }
}
