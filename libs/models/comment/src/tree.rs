use std::collections::{HashMap, HashSet};

use primitive_comment::PrimitiveComment;
use serde::Serialize;

/// The comments of a single post, indexed by parent
///
/// Comments are kept in a flat vector sorted by id, `children` maps a
/// parent id (or `None` for roots) onto indices into that vector.
#[derive(Clone, Debug, Default)]
pub struct CommentTree {
	comments: Vec<PrimitiveComment>,
	children: HashMap<Option<i32>, Vec<usize>>,
}

/// A comment with all of its replies
#[derive(Clone, Debug, Serialize)]
pub struct CommentNode {
	pub comment:  PrimitiveComment,
	pub children: Vec<CommentNode>,
}

impl CommentTree {
	#[must_use]
	pub fn build(mut comments: Vec<PrimitiveComment>) -> Self {
		comments.sort_by_key(|c| c.id);

		let known: HashSet<i32> = comments.iter().map(|c| c.id).collect();
		let mut children: HashMap<Option<i32>, Vec<usize>> = HashMap::new();

		// A reply always has a higher id than its parent, anything else
		// (orphans, self or forward references) is hung at the root
		for (idx, comment) in comments.iter().enumerate() {
			let parent = comment
				.parent_id
				.filter(|p| *p < comment.id && known.contains(p));

			children.entry(parent).or_default().push(idx);
		}

		Self { comments, children }
	}

	#[must_use]
	pub fn len(&self) -> usize { self.comments.len() }

	#[must_use]
	pub fn is_empty(&self) -> bool { self.comments.is_empty() }

	/// Direct replies to `parent`, or the roots for `None`, ordered by id
	pub fn children_of(
		&self,
		parent: Option<i32>,
	) -> impl Iterator<Item = &PrimitiveComment> {
		self.children
			.get(&parent)
			.into_iter()
			.flatten()
			.map(|&idx| &self.comments[idx])
	}

	/// Nest the comments into [`CommentNode`]s, starting at the roots
	#[must_use]
	pub fn nest(&self) -> Vec<CommentNode> {
		self.nest_with(|comment, children| {
			CommentNode { comment: comment.clone(), children }
		})
	}

	/// Fold the tree bottom-up, `make` gets every comment together with its
	/// already built replies and the built roots are returned
	///
	/// Replies always sit at a higher index than their parent, so walking
	/// the comments backwards builds every reply before the comment it
	/// answers without recursing.
	pub fn nest_with<T>(
		&self,
		mut make: impl FnMut(&PrimitiveComment, Vec<T>) -> T,
	) -> Vec<T> {
		let mut built: Vec<Option<T>> =
			self.comments.iter().map(|_| None).collect();

		for (idx, comment) in self.comments.iter().enumerate().rev() {
			let replies = self.take_built(Some(comment.id), &mut built);

			built[idx] = Some(make(comment, replies));
		}

		self.take_built(None, &mut built)
	}

	fn take_built<T>(
		&self,
		parent: Option<i32>,
		built: &mut [Option<T>],
	) -> Vec<T> {
		self.children
			.get(&parent)
			.into_iter()
			.flatten()
			.filter_map(|&idx| built[idx].take())
			.collect()
	}
}

impl Drop for CommentNode {
	// Unlink the replies first so long reply chains drop without recursing
	fn drop(&mut self) {
		let mut pending = std::mem::take(&mut self.children);

		while let Some(mut node) = pending.pop() {
			pending.append(&mut node.children);
		}
	}
}
