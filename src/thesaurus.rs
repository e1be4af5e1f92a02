//! Fixed domain vocabulary used by the normalizer and the scoring signals.

/// Coarse classification of what the user wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Intent {
    Find,
    View,
    Create,
    Delete,
    Modify,
    Install,
    Run,
    Configure,
}

impl Intent {
    /// Command-name fragments that satisfy this intent.
    pub fn command_terms(self) -> &'static [&'static str] {
        match self {
            Intent::Find => &["find", "search", "ls", "grep", "locate"],
            Intent::View => &["cat", "less", "more", "head", "tail", "view"],
            Intent::Create => &["mkdir", "touch", "create", "make"],
            Intent::Delete => &["rm", "del", "delete", "remove"],
            Intent::Modify => &["chmod", "chown", "edit", "modify", "change", "sed"],
            Intent::Install => &["install", "add", "setup"],
            Intent::Run => &["run", "exec", "start", "launch"],
            Intent::Configure => &["config", "set", "configure"],
        }
    }
}

/// The single best synonym for `word`, if the thesaurus has one.
pub fn synonym(word: &str) -> Option<&'static str> {
    let syn = match word {
        "folder" => "directory",
        "folders" => "directories",
        "dir" => "directory",
        "file" => "document",
        "contents" => "content",
        "see" | "look" | "check" => "view",
        "view" | "display" | "read" => "show",
        "show" => "view",
        "print" => "cat",
        "find" => "search",
        "search" => "find",
        "create" => "make",
        "delete" | "erase" => "remove",
        "copy" | "duplicate" => "cp",
        "move" | "rename" => "mv",
        "compress" | "pack" => "archive",
        "extract" | "unpack" | "decompress" => "unzip",
        "download" | "fetch" => "curl",
        "upload" => "push",
        "process" | "task" => "ps",
        "processes" | "tasks" => "ps",
        "kill" | "terminate" => "stop",
        "start" | "launch" => "run",
        "permission" | "permissions" | "rights" => "chmod",
        "change" | "alter" => "modify",
        "compile" => "build",
        "deploy" => "release",
        "remote" => "ssh",
        _ => return None,
    };
    Some(syn)
}

/// Canonical action verbs a query word stands for.
pub fn actions(word: &str) -> Option<&'static [&'static str]> {
    let acts: &'static [&'static str] = match word {
        "find" | "search" | "locate" => &["find", "search"],
        "list" => &["list", "show"],
        "show" | "display" | "view" | "see" | "read" | "look" | "check" => &["view", "show"],
        "create" | "make" | "generate" | "new" => &["create", "make"],
        "build" => &["build", "make"],
        "edit" | "modify" | "change" | "update" => &["edit", "modify", "change"],
        "delete" | "remove" | "destroy" | "erase" => &["delete", "remove"],
        "clean" => &["clean", "remove"],
        "run" | "execute" | "start" | "launch" => &["run", "start"],
        "install" | "add" => &["install", "add"],
        "setup" | "configure" => &["setup", "config"],
        "compress" | "archive" | "pack" => &["compress", "archive"],
        "extract" | "unpack" | "decompress" | "unzip" => &["extract", "unpack"],
        "copy" | "duplicate" => &["copy", "cp"],
        "move" | "rename" => &["move", "mv"],
        "kill" | "stop" | "terminate" => &["kill", "stop"],
        "download" | "fetch" => &["download", "fetch"],
        _ => return None,
    };
    Some(acts)
}

/// Canonical target nouns a query word stands for.
pub fn targets(word: &str) -> Option<&'static [&'static str]> {
    let tgts: &'static [&'static str] = match word {
        "file" | "files" | "document" | "documents" => &["file"],
        "folder" | "folders" | "directory" | "directories" | "dir" => &["directory", "dir"],
        "path" => &["path"],
        "content" | "contents" | "text" => &["content", "text"],
        "archive" | "archives" | "zip" | "tar" => &["archive"],
        "process" | "processes" | "task" | "tasks" => &["process"],
        "service" | "services" | "daemon" => &["service"],
        "server" | "host" => &["server", "host"],
        "port" | "ports" => &["port"],
        "url" | "website" | "site" => &["url"],
        "repo" | "repository" | "project" => &["repo", "repository"],
        "branch" | "branches" => &["branch"],
        "commit" | "commits" => &["commit"],
        "permission" | "permissions" => &["permission"],
        "user" | "users" => &["user"],
        "group" | "groups" => &["group"],
        "package" | "packages" => &["package"],
        _ => return None,
    };
    Some(tgts)
}

/// Intent implied by a canonical action verb.
pub fn intent_for_action(action: &str) -> Option<Intent> {
    let intent = match action {
        "find" | "search" | "list" => Intent::Find,
        "view" | "show" => Intent::View,
        "create" | "make" | "build" => Intent::Create,
        "delete" | "remove" | "clean" => Intent::Delete,
        "edit" | "modify" | "change" => Intent::Modify,
        "install" | "add" | "download" => Intent::Install,
        "run" | "start" => Intent::Run,
        "setup" | "config" => Intent::Configure,
        _ => return None,
    };
    Some(intent)
}

/// Intent implied by a plain keyword when no action word is present.
pub fn intent_for_keyword(word: &str) -> Option<Intent> {
    let intent = match word {
        "installation" => Intent::Install,
        "config" | "configuration" | "settings" => Intent::Configure,
        "running" | "processes" => Intent::Find,
        "permissions" | "permission" | "chmod" => Intent::Modify,
        _ => return None,
    };
    Some(intent)
}

/// Leading command names that belong to the domain `word` names.
pub fn domain_commands(word: &str) -> Option<&'static [&'static str]> {
    let cmds: &'static [&'static str] = match word {
        "compress" | "compression" => &["tar", "gzip", "zip", "bzip2", "xz", "7z", "compress"],
        "archive" => &["tar", "gzip", "zip", "bzip2", "7z", "unzip"],
        "extract" | "decompress" => &["tar", "unzip", "gunzip", "unxz", "7z"],
        "directory" | "folder" => &["mkdir", "rmdir", "ls", "dir", "cd", "pwd", "tree"],
        "create" | "new" => &["mkdir", "touch", "make"],
        "file" | "files" => &["cp", "mv", "rm", "touch", "cat", "less", "more"],
        "search" | "find" => &["grep", "find", "locate", "ag", "rg", "fd"],
        "download" => &["wget", "curl", "aria2c"],
        "git" | "version" => &["git"],
        "package" | "packages" => &["apt", "yum", "dnf", "pacman", "brew", "pip", "npm", "cargo"],
        "process" | "processes" => &["ps", "kill", "pkill", "top", "htop", "jobs"],
        "network" | "networking" => &["ping", "ssh", "scp", "rsync", "nc", "nmap", "curl", "ip"],
        "edit" => &["vim", "nano", "emacs", "sed", "awk"],
        "permission" | "permissions" => &["chmod", "chown", "chgrp", "sudo"],
        "disk" | "space" => &["df", "du", "lsblk", "mount"],
        _ => return None,
    };
    Some(cmds)
}

/// Category label a query word points at.
pub fn category_for_term(word: &str) -> Option<&'static str> {
    let cat = match word {
        "compress" | "compression" | "archive" | "archives" | "zip" | "tar" | "gzip"
        | "extract" | "decompress" | "unzip" | "unpack" | "pack" => "compression",
        "directory" | "directories" | "folder" | "folders" | "file" | "files" | "copy"
        | "move" | "rename" => "filesystem",
        "search" | "find" | "locate" | "grep" => "search",
        "download" | "network" | "networking" | "ping" | "ssh" | "port" | "url" | "http" => {
            "networking"
        }
        "process" | "processes" | "kill" | "pid" => "process",
        "git" | "commit" | "branch" | "merge" | "repo" | "repository" => "git",
        "package" | "packages" | "install" => "package",
        "permission" | "permissions" | "chmod" | "owner" => "permissions",
        _ => return None,
    };
    Some(cat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_maps_to_at_most_one_intent() {
        for word in ["find", "show", "create", "delete", "edit", "run", "install", "setup"] {
            let acts = actions(word).unwrap();
            assert!(intent_for_action(acts[0]).is_some(), "{word}");
        }
    }

    #[test]
    fn compression_terms_share_a_category() {
        for word in ["compress", "archive", "zip", "tar", "extract"] {
            assert_eq!(category_for_term(word), Some("compression"));
        }
        assert_eq!(category_for_term("banana"), None);
    }

    #[test]
    fn synonyms_are_single_valued() {
        assert_eq!(synonym("folder"), Some("directory"));
        assert_eq!(synonym("directory"), None);
    }
}
