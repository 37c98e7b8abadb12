//! The frame dependency graph.

use smallvec::SmallVec;

use crate::error::SchedError;
use crate::system::SystemFn;

pub(crate) struct Task {
    pub(crate) name: String,
    pub(crate) run: SystemFn,
    pub(crate) children: SmallVec<[usize; 4]>,
    pub(crate) indegree: usize,
}

/// Assembles tasks and precedence edges into a [`TaskGraph`].
///
/// Building is two passes: callers first add every task, then wire edges
/// between the returned indices. [`build`](Self::build) validates
/// acyclicity.
pub struct GraphBuilder {
    tasks: Vec<Task>,
}

impl GraphBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Add a task, returning its index for edge wiring.
    pub fn add(&mut self, name: &str, run: SystemFn) -> usize {
        self.tasks.push(Task {
            name: name.to_owned(),
            run,
            children: SmallVec::new(),
            indegree: 0,
        });
        self.tasks.len() - 1
    }

    /// Require `before` to finish before `after` starts.
    pub fn add_edge(&mut self, before: usize, after: usize) {
        if !self.tasks[before].children.contains(&after) {
            self.tasks[before].children.push(after);
            self.tasks[after].indegree += 1;
        }
    }

    /// Validate and freeze the graph.
    ///
    /// Runs a Kahn traversal; if it cannot visit every task the declared
    /// edges contain a cycle and [`SchedError::Cycle`] is returned.
    pub fn build(self) -> Result<TaskGraph, SchedError> {
        let mut indegree: Vec<usize> = self.tasks.iter().map(|t| t.indegree).collect();
        let mut queue: Vec<usize> = (0..self.tasks.len())
            .filter(|&i| indegree[i] == 0)
            .collect();
        let roots = queue.clone();
        let mut visited = 0;
        while let Some(task) = queue.pop() {
            visited += 1;
            for &child in &self.tasks[task].children {
                indegree[child] -= 1;
                if indegree[child] == 0 {
                    queue.push(child);
                }
            }
        }
        if visited != self.tasks.len() {
            return Err(SchedError::Cycle);
        }
        Ok(TaskGraph {
            tasks: self.tasks,
            roots,
        })
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A validated, immutable frame graph.
///
/// The executor walks it once per frame; the graph itself carries no
/// execution state, so one graph can be reused across frames and shared
/// between the frame thread and the workers.
pub struct TaskGraph {
    tasks: Vec<Task>,
    roots: Vec<usize>,
}

impl TaskGraph {
    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the graph has no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks with no prerequisites.
    pub(crate) fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub(crate) fn task(&self, index: usize) -> &Task {
        &self.tasks[index]
    }

    /// Initial indegree of every task, copied per execution.
    pub(crate) fn indegrees(&self) -> Vec<usize> {
        self.tasks.iter().map(|t| t.indegree).collect()
    }

    /// Task names in insertion order, for diagnostics.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|t| t.name.as_str())
    }
}
